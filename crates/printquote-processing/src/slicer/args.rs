use printquote_core::models::SlicerConfig;
use std::ffi::OsString;
use std::path::Path;

use super::ProfileSet;

/// Argument list for one engine invocation.
///
/// Every path and value is a discrete argument; nothing is ever joined into a
/// shell string.
pub fn build_args(
    extra_args: &[String],
    profiles: &ProfileSet,
    config: &SlicerConfig,
    input: &Path,
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = extra_args.iter().map(OsString::from).collect();

    args.push("--export-gcode".into());
    for (_, profile) in profiles.iter() {
        args.push("--load".into());
        args.push(profile.as_os_str().to_owned());
    }
    args.extend([
        OsString::from("--layer-height"),
        OsString::from(config.layer_height_mm().to_string()),
        OsString::from("--fill-density"),
        OsString::from(format!("{}%", config.infill_density)),
        OsString::from("--fill-pattern"),
        OsString::from(config.infill_type.as_str()),
        OsString::from("--output"),
    ]);
    args.push(output.as_os_str().to_owned());
    args.push(input.as_os_str().to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use printquote_core::models::{InfillType, Material, Quality};

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn builds_engine_arguments_in_order() {
        let config =
            SlicerConfig::new(Quality::Standard, Material::Pla, 20, InfillType::Grid).unwrap();
        let profiles = ProfileSet::resolve(Path::new("/p"), &config);
        let args = build_args(
            &["script.sh".to_string()],
            &profiles,
            &config,
            Path::new("/tmp/1_abc.stl"),
            Path::new("/tmp/slice_1_xyz.gcode"),
        );

        assert_eq!(
            strings(&args),
            vec![
                "script.sh",
                "--export-gcode",
                "--load",
                "/p/printer.ini",
                "--load",
                "/p/filament_pla.ini",
                "--load",
                "/p/quality_standard.ini",
                "--layer-height",
                "0.2",
                "--fill-density",
                "20%",
                "--fill-pattern",
                "grid",
                "--output",
                "/tmp/slice_1_xyz.gcode",
                "/tmp/1_abc.stl",
            ]
        );
    }

    #[test]
    fn hostile_file_names_stay_single_arguments() {
        let config =
            SlicerConfig::new(Quality::Ultra, Material::Abs, 100, InfillType::Gyroid).unwrap();
        let profiles = ProfileSet::resolve(Path::new("/p"), &config);
        let input = Path::new("/tmp/model; rm -rf ~ $(reboot).stl");
        let args = build_args(&[], &profiles, &config, input, Path::new("/tmp/o.gcode"));

        assert_eq!(args.last().unwrap(), input.as_os_str());
        assert!(strings(&args).contains(&"0.05".to_string()));
        assert!(strings(&args).contains(&"100%".to_string()));
    }
}
