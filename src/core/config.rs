use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AmfiProviderConfig {
    pub feed_url: String,
}

impl Default for AmfiProviderConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://portal.amfiindia.com/spages/NAVAll.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MfApiProviderConfig {
    pub base_url: String,
}

impl Default for MfApiProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mfapi.in".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub amfi: AmfiProviderConfig,
    #[serde(default)]
    pub mfapi: MfApiProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rows dated before this year are dropped.
    pub cutoff_year: i32,
    /// Number of shuffled records that get enriched.
    pub enrich_limit: usize,
    /// Concurrent metadata lookups per batch.
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub retries: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cutoff_year: 2025,
            enrich_limit: 400,
            batch_size: 20,
            request_timeout_secs: 30,
            retries: 0,
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    /// Offset of the schedule's time zone from UTC, in minutes.
    pub utc_offset_minutes: i32,
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Midnight, India Standard Time
        Self {
            hour: 0,
            minute: 0,
            utc_offset_minutes: 330,
            run_on_start: false,
        }
    }
}

impl ScheduleConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .with_context(|| format!("Invalid UTC offset: {} minutes", self.utc_offset_minutes))
    }

    fn validate(&self) -> Result<()> {
        if self.hour > 23 || self.minute > 59 {
            bail!(
                "Invalid schedule time {:02}:{:02}",
                self.hour,
                self.minute
            );
        }
        self.offset().map(|_| ())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Allowed CORS origin, any origin when unset.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:4000".to_string(),
            cors_origin: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "navfeed", "navfeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "navfeed", "navfeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.default_data_path()?.join("cache"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size == 0 {
            bail!("pipeline.batch_size must be at least 1");
        }
        self.schedule.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_yaml("").unwrap();

        assert_eq!(
            config.providers.amfi.feed_url,
            "https://portal.amfiindia.com/spages/NAVAll.txt"
        );
        assert_eq!(config.providers.mfapi.base_url, "https://api.mfapi.in");
        assert_eq!(config.pipeline.cutoff_year, 2025);
        assert_eq!(config.pipeline.enrich_limit, 400);
        assert_eq!(config.pipeline.batch_size, 20);
        assert_eq!(config.pipeline.retries, 0);
        assert_eq!(config.schedule.utc_offset_minutes, 330);
        assert!(!config.schedule.run_on_start);
        assert_eq!(config.server.bind, "0.0.0.0:4000");
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  amfi:
    feed_url: "http://example.com/NAVAll.txt"
  mfapi:
    base_url: "http://example.com/mfapi"
pipeline:
  cutoff_year: 2024
  batch_size: 5
schedule:
  hour: 21
  minute: 30
  utc_offset_minutes: 0
server:
  cors_origin: "http://localhost:5173"
data_path: "/tmp/navfeed"
"#;

        let config = AppConfig::from_yaml(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.amfi.feed_url,
            "http://example.com/NAVAll.txt"
        );
        assert_eq!(config.providers.mfapi.base_url, "http://example.com/mfapi");
        assert_eq!(config.pipeline.cutoff_year, 2024);
        assert_eq!(config.pipeline.batch_size, 5);
        // Unset keys in a present section keep their defaults
        assert_eq!(config.pipeline.enrich_limit, 400);
        assert_eq!(config.schedule.hour, 21);
        assert_eq!(config.schedule.minute, 30);
        assert_eq!(
            config.server.cors_origin.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(
            config.cache_dir().unwrap(),
            PathBuf::from("/tmp/navfeed").join("cache")
        );
    }

    #[test]
    fn test_config_rejects_invalid_schedule() {
        let err = AppConfig::from_yaml("schedule:\n  hour: 24\n").unwrap_err();
        assert!(err.to_string().contains("Invalid schedule time"));
    }

    #[test]
    fn test_config_rejects_zero_batch_size() {
        assert!(AppConfig::from_yaml("pipeline:\n  batch_size: 0\n").is_err());
    }
}
