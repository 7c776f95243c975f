//! Configuration for the sarathi-link client
//!
//! Loads configuration from a TOML file with the few parameters the link
//! needs: where the robot lives, which firmware generation it runs, and how
//! the console renders.

use crate::error::Result;
use crate::session::Generation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default TCP control port on the robot
pub const DEFAULT_CONTROL_PORT: u16 = 43210;
/// Default local UDP telemetry port
pub const DEFAULT_TELEMETRY_PORT: u16 = 37755;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub link: LinkConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Robot link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Robot hostname (resolved at connect time)
    pub host: String,
    /// TCP control port on the robot
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Local UDP port the robot streams telemetry to
    #[serde(default = "default_telemetry_port")]
    pub telemetry_port: u16,
    /// Firmware generation the robot runs
    #[serde(default)]
    pub generation: Generation,
}

/// Console rendering configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Telemetry snapshot cadence in milliseconds
    ///
    /// Paces only what gets printed; inbound frames are parsed and applied
    /// the moment they arrive, independent of this cadence.
    pub refresh_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

fn default_control_port() -> u16 {
    DEFAULT_CONTROL_PORT
}

fn default_telemetry_port() -> u16 {
    DEFAULT_TELEMETRY_PORT
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for the classic balance-robot firmware
    ///
    /// Suitable for bench testing; deployments should use a TOML file.
    pub fn classic_defaults() -> Self {
        Self {
            link: LinkConfig {
                host: "raspberrypi.local".to_string(),
                control_port: DEFAULT_CONTROL_PORT,
                telemetry_port: DEFAULT_TELEMETRY_PORT,
                generation: Generation::Classic,
            },
            display: DisplayConfig { refresh_ms: 100 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::classic_defaults()
    }
}
