//! Configuration module
//!
//! Environment-driven configuration for the HTTP service, the slicing engine,
//! pricing and the temporary file store. Every value has a documented default;
//! `.env` files are honoured through `dotenvy`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Material;

// Defaults
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TEMP_DIR: &str = "./tmp/printquote";
const MAX_UPLOAD_SIZE_MB: u64 = 50;
const UPLOAD_TTL_HOURS: u64 = 24;
const OUTPUT_TTL_HOURS: u64 = 1;
const SWEEP_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SLICER_PATH: &str = "prusa-slicer";
const DEFAULT_PROFILES_DIR: &str = "./slicer-profiles";
const SLICER_TIMEOUT_MS: u64 = 60_000;
const SLICER_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;
const MACHINE_HOURLY_RATE: f64 = 1500.0;
const SETUP_FEE: f64 = 1000.0;
const RATE_PLA: f64 = 350.0;
const RATE_PETG: f64 = 500.0;
const RATE_ABS: f64 = 700.0;
const RATE_RESIN: f64 = 1100.0;
const MAX_QUANTITY: u32 = 1000;

// Upper bounds for values that are scaled before use.
const MAX_UPLOAD_SIZE_LIMIT_MB: u64 = 4096;
const MAX_TTL_HOURS: u64 = 24 * 365;

/// External slicing engine settings.
#[derive(Clone, Debug)]
pub struct SlicerSettings {
    /// Engine binary, either an absolute path or a name resolved through `PATH`.
    pub path: String,
    /// Arguments placed before the generated ones.
    pub extra_args: Vec<String>,
    pub profiles_dir: PathBuf,
    pub timeout: Duration,
    /// Cap for each captured stdout/stderr stream.
    pub max_output_bytes: usize,
}

/// Rates in NGN.
#[derive(Clone, Debug)]
pub struct PricingSettings {
    pub machine_hourly_rate: f64,
    pub setup_fee: f64,
    pub rate_pla: f64,
    pub rate_petg: f64,
    pub rate_abs: f64,
    pub rate_resin: f64,
    pub max_quantity: u32,
    pub reject_incomplete_gcode: bool,
}

impl PricingSettings {
    /// Price per gram for `material`.
    pub fn material_rate(&self, material: Material) -> f64 {
        match material {
            Material::Pla => self.rate_pla,
            Material::Petg => self.rate_petg,
            Material::Abs => self.rate_abs,
            Material::Resin => self.rate_resin,
        }
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            machine_hourly_rate: MACHINE_HOURLY_RATE,
            setup_fee: SETUP_FEE,
            rate_pla: RATE_PLA,
            rate_petg: RATE_PETG,
            rate_abs: RATE_ABS,
            rate_resin: RATE_RESIN,
            max_quantity: MAX_QUANTITY,
            reject_incomplete_gcode: false,
        }
    }
}

/// Flat temp directory shared by uploads and engine output.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub temp_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub upload_ttl_hours: u64,
    pub output_ttl_hours: u64,
    /// 0 disables the periodic sweep.
    pub sweep_interval_secs: u64,
}

impl StorageSettings {
    /// Clamped to one year; `Config::validate` rejects anything longer.
    pub fn upload_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.upload_ttl_hours.min(MAX_TTL_HOURS) as i64)
    }

    pub fn output_ttl(&self) -> Duration {
        Duration::from_secs(self.output_ttl_hours.min(MAX_TTL_HOURS) * 3600)
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_json: bool,
    pub storage: StorageSettings,
    pub slicer: SlicerSettings,
    pub pricing: PricingSettings,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let max_upload_mb: u64 = parse_or(var("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);
        if max_upload_mb > MAX_UPLOAD_SIZE_LIMIT_MB {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must not exceed {}",
                MAX_UPLOAD_SIZE_LIMIT_MB
            ));
        }

        let storage = StorageSettings {
            temp_dir: PathBuf::from(var("TEMP_DIR").unwrap_or_else(|| DEFAULT_TEMP_DIR.to_string())),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            upload_ttl_hours: parse_or(var("UPLOAD_TTL_HOURS"), UPLOAD_TTL_HOURS),
            output_ttl_hours: parse_or(var("OUTPUT_TTL_HOURS"), OUTPUT_TTL_HOURS),
            sweep_interval_secs: parse_or(var("SWEEP_INTERVAL_SECS"), SWEEP_INTERVAL_SECS),
        };

        let slicer = SlicerSettings {
            path: var("SLICER_PATH").unwrap_or_else(|| DEFAULT_SLICER_PATH.to_string()),
            extra_args: var("SLICER_EXTRA_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            profiles_dir: PathBuf::from(
                var("SLICER_PROFILES_DIR").unwrap_or_else(|| DEFAULT_PROFILES_DIR.to_string()),
            ),
            timeout: Duration::from_millis(parse_or(var("SLICER_TIMEOUT_MS"), SLICER_TIMEOUT_MS)),
            max_output_bytes: parse_or(var("SLICER_MAX_OUTPUT_BYTES"), SLICER_MAX_OUTPUT_BYTES),
        };

        let pricing = PricingSettings {
            machine_hourly_rate: parse_or(var("PRICING_MACHINE_HOURLY_RATE"), MACHINE_HOURLY_RATE),
            setup_fee: parse_or(var("PRICING_SETUP_FEE"), SETUP_FEE),
            rate_pla: parse_or(var("PRICING_RATE_PLA"), RATE_PLA),
            rate_petg: parse_or(var("PRICING_RATE_PETG"), RATE_PETG),
            rate_abs: parse_or(var("PRICING_RATE_ABS"), RATE_ABS),
            rate_resin: parse_or(var("PRICING_RATE_RESIN"), RATE_RESIN),
            max_quantity: parse_or(var("MAX_QUANTITY"), MAX_QUANTITY),
            reject_incomplete_gcode: var("REJECT_INCOMPLETE_GCODE")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        let config = Config {
            server_port,
            environment,
            cors_origins,
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            storage,
            slicer,
            pricing,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.storage.max_upload_bytes > MAX_UPLOAD_SIZE_LIMIT_MB * 1024 * 1024 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must not exceed {}",
                MAX_UPLOAD_SIZE_LIMIT_MB
            ));
        }

        if self.storage.upload_ttl_hours > MAX_TTL_HOURS
            || self.storage.output_ttl_hours > MAX_TTL_HOURS
        {
            return Err(anyhow::anyhow!(
                "UPLOAD_TTL_HOURS and OUTPUT_TTL_HOURS must not exceed {}",
                MAX_TTL_HOURS
            ));
        }

        if self.storage.upload_ttl_hours == 0 || self.storage.output_ttl_hours == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_TTL_HOURS and OUTPUT_TTL_HOURS must be greater than 0"
            ));
        }

        if self.slicer.timeout.is_zero() {
            return Err(anyhow::anyhow!("SLICER_TIMEOUT_MS must be greater than 0"));
        }

        // The sweeper relies on the retention window outliving any running slice.
        if self.storage.output_ttl() <= self.slicer.timeout {
            return Err(anyhow::anyhow!(
                "OUTPUT_TTL_HOURS must be longer than SLICER_TIMEOUT_MS"
            ));
        }

        if self.slicer.path.trim().is_empty() {
            return Err(anyhow::anyhow!("SLICER_PATH must not be empty"));
        }

        let p = &self.pricing;
        let rates = [
            p.machine_hourly_rate,
            p.setup_fee,
            p.rate_pla,
            p.rate_petg,
            p.rate_abs,
            p.rate_resin,
        ];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(anyhow::anyhow!(
                "Pricing rates must be finite, non-negative numbers"
            ));
        }

        if p.max_quantity == 0 {
            return Err(anyhow::anyhow!("MAX_QUANTITY must be at least 1"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
