use printquote_core::models::is_engine_output_name;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Counts from one pass over the output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes stale engine output from the shared temp directory.
///
/// Only names produced by the slicer invoker are considered, so uploads and
/// foreign files in the same directory are never touched. Errors are logged
/// and counted, never returned.
#[derive(Debug, Clone)]
pub struct OutputSweeper {
    dir: PathBuf,
}

impl OutputSweeper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[tracing::instrument(skip(self), fields(cleanup.dir = %self.dir.display()))]
    pub async fn sweep(&self, ttl: Duration) -> SweepReport {
        let mut report = SweepReport::default();
        let now = SystemTime::now();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read output directory");
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read directory entry");
                    report.failed += 1;
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_engine_output_name(name) {
                continue;
            }
            report.scanned += 1;

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(error = %e, file = %name, "Failed to stat output file");
                    report.failed += 1;
                    continue;
                }
            };

            // Clock skew can put mtime in the future; such files are fresh.
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= ttl {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::debug!(file = %name, age_secs = age.as_secs(), "Deleted stale output");
                    report.deleted += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(error = %e, file = %name, "Failed to delete stale output");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            failed = report.failed,
            "Output sweep completed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age: Duration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[tokio::test]
    async fn deletes_only_stale_engine_output() {
        let dir = TempDir::new().unwrap();
        let hour = Duration::from_secs(3600);

        let stale = touch(dir.path(), "slice_1700000000000_abcd1234.gcode", hour * 2);
        let fresh = touch(dir.path(), "slice_1700000000001_abcd1234.gcode", Duration::ZERO);
        let old_upload = touch(dir.path(), "1700000000000_x9Yz.stl", hour * 48);
        let foreign = touch(dir.path(), "notes.gcode", hour * 48);

        let report = OutputSweeper::new(dir.path()).sweep(hour).await;

        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                deleted: 1,
                failed: 0
            }
        );
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(old_upload.exists());
        assert!(foreign.exists());
    }

    #[tokio::test]
    async fn missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let sweeper = OutputSweeper::new(dir.path().join("gone"));
        assert_eq!(sweeper.sweep(Duration::from_secs(1)).await, SweepReport::default());
    }
}
