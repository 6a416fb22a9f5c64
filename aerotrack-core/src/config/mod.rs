//! Configuration types
//!
//! Board parameters are compile-time data; user settings are postcard
//! binary data kept in the EEPROM.

pub mod board;
pub mod settings;

pub use board::{
    probe_variant, BoardConfig, BoardError, BoardFeatures, BoardPins, BoardVariant,
    HardwareModel, PinId, Port,
};
pub use settings::{OutputRoute, Settings, SettingsError, Volume};
