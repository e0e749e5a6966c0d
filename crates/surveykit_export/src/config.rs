//! Layered export configuration.
//!
//! Sources, highest priority first:
//! 1. `S3_BUCKET_NAME` (the documented bucket setting)
//! 2. `SURVEYKIT_*` environment variables (`SURVEYKIT_LINK_TTL_SECS` -> `link_ttl_secs`)
//! 3. `surveykit.toml` in the working directory, or an explicit file
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::assemble::ReportProfileKind;
use crate::error::ConfigError;

/// Default bucket when `S3_BUCKET_NAME` is unset.
pub const DEFAULT_BUCKET_NAME: &str = "competency-surveys";
/// Retrieval link lifetime for exported reports (7 days).
pub const DEFAULT_LINK_TTL_SECS: u64 = 604_800;
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "surveykit.toml";

fn default_bucket_name() -> String {
    String::from(DEFAULT_BUCKET_NAME)
}

fn default_link_ttl_secs() -> u64 {
    DEFAULT_LINK_TTL_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Bucket holding both `reports/` inputs and `exports/` outputs.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// AWS region; falls back to the SDK environment when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Permit plain-HTTP endpoints (local emulators).
    #[serde(default)]
    pub allow_http: bool,

    /// Retrieval link lifetime in seconds.
    #[serde(default = "default_link_ttl_secs")]
    pub link_ttl_secs: u64,

    /// Which sheets to emit.
    #[serde(default)]
    pub profile: ReportProfileKind,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            bucket_name: default_bucket_name(),
            region: None,
            endpoint: None,
            allow_http: false,
            link_ttl_secs: default_link_ttl_secs(),
            profile: ReportProfileKind::default(),
        }
    }
}

impl ExportConfig {
    /// Load from defaults, `surveykit.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit TOML file in place of `surveykit.toml`.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let path_file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if path_file.exists() {
            figment = figment.merge(Toml::file(path_file));
        }

        figment
            .merge(Env::prefixed("SURVEYKIT_"))
            .merge(
                Env::raw()
                    .only(&["S3_BUCKET_NAME"])
                    .map(|_| "bucket_name".into()),
            )
    }

    /// Reject values the storage backend cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bucket_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        // S3 presigned URLs cap out at seven days.
        if self.link_ttl_secs == 0 || self.link_ttl_secs > DEFAULT_LINK_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "link_ttl_secs".to_string(),
                reason: format!("must be within 1..={DEFAULT_LINK_TTL_SECS}"),
            });
        }
        Ok(())
    }

    /// Retrieval link lifetime.
    pub fn link_ttl(&self) -> Duration {
        Duration::from_secs(self.link_ttl_secs)
    }
}
