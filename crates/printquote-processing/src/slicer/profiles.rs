use printquote_core::models::SlicerConfig;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use super::SlicerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Printer,
    Filament,
    Quality,
}

impl Display for ProfileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProfileKind::Printer => write!(f, "printer"),
            ProfileKind::Filament => write!(f, "filament"),
            ProfileKind::Quality => write!(f, "quality"),
        }
    }
}

/// The three profile files loaded for one invocation, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    pub printer: PathBuf,
    pub filament: PathBuf,
    pub quality: PathBuf,
}

impl ProfileSet {
    /// `printer.ini`, `filament_<material>.ini`, `quality_<quality>.ini`.
    pub fn resolve(profiles_dir: &Path, config: &SlicerConfig) -> Self {
        Self {
            printer: profiles_dir.join("printer.ini"),
            filament: profiles_dir.join(format!(
                "filament_{}.ini",
                config.material.profile_token()
            )),
            quality: profiles_dir.join(format!("quality_{}.ini", config.quality.as_str())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileKind, &Path)> {
        [
            (ProfileKind::Printer, self.printer.as_path()),
            (ProfileKind::Filament, self.filament.as_path()),
            (ProfileKind::Quality, self.quality.as_path()),
        ]
        .into_iter()
    }

    /// Every profile must be a regular file that can be opened for reading.
    pub async fn validate(&self) -> Result<(), SlicerError> {
        for (kind, path) in self.iter() {
            let readable = match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_file() => tokio::fs::File::open(path).await.is_ok(),
                _ => false,
            };
            if !readable {
                return Err(SlicerError::ProfileMissing {
                    kind,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}
