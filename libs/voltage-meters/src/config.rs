//! Meter device configuration
//!
//! Loads the list of metered devices from YAML/TOML/JSON and resolves each
//! one to a producer through the driver registry.
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed `VOLTAGE_METERS_` (nested keys with `__`)
//! 2. Configuration file
//! 3. Default values

use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{MeterError, Result};
use crate::producer::{DriverOptions, Producer};
use crate::registry::DriverRegistry;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "VOLTAGE_METERS_";

/// Top-level meter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// One metered device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device name
    pub name: String,
    /// Driver model name, case-sensitive (e.g. "PQPLUS")
    pub model: String,
    /// Modbus slave ID
    #[serde(default = "default_slave_id")]
    pub slave_id: u8,
    /// Driver options
    #[serde(default)]
    pub options: DriverOptions,
}

fn default_slave_id() -> u8 {
    1
}

impl DeviceConfig {
    /// Build this device's producer
    pub fn resolve(&self, registry: &DriverRegistry) -> Result<Box<dyn Producer>> {
        registry.create(&self.model, &self.options)
    }
}

impl MeterConfig {
    /// Check device names and option values
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for device in &self.devices {
            if device.name.trim().is_empty() {
                return Err(MeterError::config("device name must not be empty"));
            }
            if !names.insert(device.name.as_str()) {
                return Err(MeterError::config(format!(
                    "duplicate device name: {}",
                    device.name
                )));
            }
            if let Some(scale) = device.options.current_scale {
                if !scale.is_finite() || scale == 0.0 {
                    return Err(MeterError::config(format!(
                        "device {}: current_scale must be finite and non-zero, got {}",
                        device.name, scale
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve every device, failing on the first unknown model
    pub fn resolve_all(
        &self,
        registry: &DriverRegistry,
    ) -> Result<Vec<(&DeviceConfig, Box<dyn Producer>)>> {
        self.devices
            .iter()
            .map(|device| Ok((device, device.resolve(registry)?)))
            .collect()
    }
}

/// Load configuration from a file plus environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MeterConfig> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MeterError::config("Config file must have an extension"))?;

    let figment = match extension {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        _ => {
            return Err(MeterError::config(format!(
                "Unsupported config file format: {}",
                extension
            )))
        },
    };

    let config: MeterConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    config.validate()?;

    info!(
        "Loaded {} meter devices from {}",
        config.devices.len(),
        path.display()
    );
    Ok(config)
}
