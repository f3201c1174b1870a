//! src/graph/config.rs
//!
//! Per-channel graph parameters: default window and fallback Y range.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Number of samples visible before any zoom; also the scroll page size.
    pub window_width: usize,

    /// Y range used after a reset, before any data has been autoscaled.
    pub y_range: (f64, f64),
}

impl GraphConfig {
    /// Create a new `GraphConfig`.
    pub fn new(window_width: usize, y_range: (f64, f64)) -> Self {
        Self {
            window_width,
            y_range,
        }
    }

    pub fn width(&self) -> f64 {
        self.window_width as f64
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            window_width: 100,
            y_range: (0.0, 1.0),
        }
    }
}
