//! Peripheral lifecycle management

pub mod manager;

pub use manager::{finalize_all, poll_all, setup_all, PeripheralReport};
