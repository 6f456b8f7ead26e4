use serde::Serialize;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Whether the configured engine binary can be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Installed,
    NotInstalled,
    NotExecutable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EngineCheck {
    pub status: EngineStatus,
    /// Configured value (path or bare command name).
    pub path: String,
    /// Location the command resolved to, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub resolved_path: Option<PathBuf>,
}

impl EngineCheck {
    pub fn is_usable(&self) -> bool {
        self.status == EngineStatus::Installed
    }
}

/// Probe the engine binary without running it.
///
/// A value containing a path separator is checked as-is; a bare name is
/// looked up in `PATH`.
pub async fn check_engine(path: &str) -> EngineCheck {
    let configured = path.to_string();
    let candidate = Path::new(path);

    let candidates: Vec<PathBuf> = if candidate.components().count() > 1 || candidate.is_absolute() {
        vec![candidate.to_path_buf()]
    } else {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).map(|dir| dir.join(path)).collect())
            .unwrap_or_default()
    };

    let mut found_not_executable: Option<PathBuf> = None;
    for candidate in candidates {
        let Ok(meta) = tokio::fs::metadata(&candidate).await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        if is_executable(&meta) {
            return EngineCheck {
                status: EngineStatus::Installed,
                path: configured,
                resolved_path: Some(candidate),
            };
        }
        found_not_executable.get_or_insert(candidate);
    }

    match found_not_executable {
        Some(candidate) => EngineCheck {
            status: EngineStatus::NotExecutable,
            path: configured,
            resolved_path: Some(candidate),
        },
        None => EngineCheck {
            status: EngineStatus::NotInstalled,
            path: configured,
            resolved_path: None,
        },
    }
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    true
}
