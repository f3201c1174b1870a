//! src/config.rs
//!
//! Application configuration, read from a TOML file.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 921600
//!
//! [graph]
//! window_width = 100
//! y_range = [0.0, 1.0]
//!
//! [timing]
//! poll_interval_ms = 100
//! edit_debounce_ms = 50
//! load_refetch_ms = 50
//!
//! [paths]
//! series_dir = "."
//! log_file = "loopmon.log"
//! ```
//!
//! Every section and key is optional; missing values take the defaults
//! shown above.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MonitorError, Result};
use crate::graph::GraphConfig;

pub const DEFAULT_CONFIG_FILE: &str = "loopmon.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub graph: GraphConfig,
    pub timing: TimingConfig,
    pub paths: PathsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port opened on connect; `None` means pick the first listed port.
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 921_600,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Live mode sends `live` this often.
    pub poll_interval_ms: u64,
    /// Quiet period after the last edit before the table is re-read.
    pub edit_debounce_ms: u64,
    /// Delay between `load` and the follow-up `param` request.
    pub load_refetch_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            edit_debounce_ms: 50,
            load_refetch_ms: 50,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn edit_debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }

    pub fn load_refetch(&self) -> Duration {
        Duration::from_millis(self.load_refetch_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where series files are saved and loaded.
    pub series_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            series_dir: PathBuf::from("."),
            log_file: PathBuf::from("loopmon.log"),
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("failed to read {:?}: {}", path, e))
        })?;
        let config = Self::from_toml(&text)?;
        info!(?path, "configuration loaded");
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise. A file that exists but
    /// does not parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MonitorError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.graph.window_width == 0 {
            return Err(MonitorError::Config("graph.window_width must be > 0".into()));
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(MonitorError::Config("timing.poll_interval_ms must be > 0".into()));
        }
        let (lo, hi) = self.graph.y_range;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(MonitorError::Config(format!(
                "graph.y_range [{}, {}] is not a valid range",
                lo, hi
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = AppConfig::from_toml("").unwrap();
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.serial.baud_rate, 921_600);
        assert_eq!(c.graph.window_width, 100);
        assert_eq!(c.timing.edit_debounce(), Duration::from_millis(50));
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let c = AppConfig::from_toml(
            "[serial]\nport = \"/dev/ttyUSB1\"\n[graph]\nwindow_width = 250\n",
        )
        .unwrap();
        assert_eq!(c.serial.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(c.serial.baud_rate, 921_600);
        assert_eq!(c.graph.window_width, 250);
        assert_eq!(c.graph.y_range, (0.0, 1.0));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml("[graph]\nwindow_width = 0\n").is_err());
        assert!(AppConfig::from_toml("[graph]\ny_range = [2.0, 1.0]\n").is_err());
        assert!(AppConfig::from_toml("[timing]\npoll_interval_ms = \"x\"\n").is_err());
    }

    #[test]
    fn toml_round_trips() {
        let mut c = AppConfig::default();
        c.serial.port = Some("COM3".into());
        let text = c.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), c);
    }
}
