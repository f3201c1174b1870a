//! src/panels.rs
//!
//! Top-level panels module and re-exports.

pub mod eeprom;
pub mod graph;
pub mod paragraph;
pub mod params;
pub mod status;
pub mod title;

pub use eeprom::EepromPanel;
pub use graph::GraphPanel;
pub use paragraph::ParagraphPanel;
pub use params::ParamsPanel;
pub use status::StatusPanel;
pub use title::TitlePanel;
