use crate::error::ConfigError;
use crate::exposition::DEFAULT_OBJECT_PREFIX;
use crate::reader::DEFAULT_RAW_BASE;
use crate::registry::{builtin_specs, ChannelRegistry, ChannelSpec};
use crate::sampler::DEFAULT_PERIOD;
use sensor_bus::ObjectPath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SERVICE_NAME: &str = "xyz.openbmc_project.Hwmon.IIO";

/// Startup configuration. Every field has a compiled-in default, so an empty file (or no
/// file at all) yields the stock board setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub service_name: String,
    pub object_prefix: String,
    pub raw_base_path: String,
    pub period_ms: u64,
    pub channels: Vec<ChannelSpec>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            object_prefix: DEFAULT_OBJECT_PREFIX.to_string(),
            raw_base_path: DEFAULT_RAW_BASE.to_string(),
            period_ms: DEFAULT_PERIOD.as_millis() as u64,
            channels: builtin_specs(),
        }
    }
}

impl DaemonConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: DaemonConfig = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.period()?;
        self.prefix()?;
        ChannelRegistry::from_specs(&self.channels)?;
        Ok(())
    }

    pub fn period(&self) -> Result<Duration, ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(Duration::from_millis(self.period_ms))
    }

    pub fn prefix(&self) -> Result<ObjectPath, ConfigError> {
        ObjectPath::new(self.object_prefix.as_str())
            .ok_or_else(|| ConfigError::InvalidPrefix(self.object_prefix.clone()))
    }

    pub fn registry(&self) -> Result<ChannelRegistry, ConfigError> {
        Ok(ChannelRegistry::from_specs(&self.channels)?)
    }
}
