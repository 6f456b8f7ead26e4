//! Model files and slicer profiles.

use axum_test::multipart::{MultipartForm, Part};
use std::fmt::Write;
use std::path::Path;

pub fn write_profiles(dir: &Path) {
    std::fs::create_dir_all(dir).expect("profiles dir");
    let mut names = vec!["printer.ini".to_string()];
    names.extend(["pla", "petg", "abs", "resin"].map(|m| format!("filament_{m}.ini")));
    names.extend(["draft", "standard", "high", "ultra"].map(|q| format!("quality_{q}.ini")));
    for name in names {
        std::fs::write(dir.join(name), "# test profile\n").expect("profile");
    }
}

/// ASCII STL of a cube tessellated into `triangles` facets.
pub fn cube_stl(triangles: usize) -> Vec<u8> {
    let mut stl = String::from("solid cube\n");
    for i in 0..triangles {
        let z = (i % 10) as f32;
        let _ = write!(
            stl,
            "facet normal 0 0 1\n outer loop\n  vertex 0 0 {z}\n  vertex 10 0 {z}\n  vertex 0 10 {z}\n endloop\nendfacet\n"
        );
    }
    stl.push_str("endsolid cube\n");
    stl.into_bytes()
}

pub fn model_form(file_name: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_type("application/octet-stream"),
    )
}
