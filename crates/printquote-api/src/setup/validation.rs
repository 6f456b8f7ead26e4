//! Configuration validation
//!
//! Startup checks on top of `Config::validate`. Problems that only make the
//! slice endpoint fail (a missing engine or profile) are logged, not fatal,
//! so the health endpoint can report them.

use anyhow::Result;
use printquote_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if !config.slicer.profiles_dir.is_dir() {
        tracing::warn!(
            profiles_dir = %config.slicer.profiles_dir.display(),
            "SLICER_PROFILES_DIR does not exist - every slice request will fail"
        );
    }

    if config.slicer.timeout.as_secs() > 600 {
        tracing::warn!(
            timeout_ms = config.slicer.timeout.as_millis() as u64,
            "SLICER_TIMEOUT_MS is very high - queued requests may wait a long time"
        );
    }

    if config.storage.sweep_interval_secs == 0 {
        tracing::warn!("SWEEP_INTERVAL_SECS is 0 - expired uploads and output are never swept");
    }

    Ok(())
}
