//! Board-agnostic core logic for the Aerotrack firmware
//!
//! Everything here runs on top of the [`aerotrack_hal::Platform`] capability
//! table and never touches hardware directly:
//!
//! - Reset-cause decoding and free-memory estimation
//! - Boot/power state machine and the cold-boot protocol
//! - Watchdog supervision
//! - Peripheral lifecycle management
//! - Board variants as data, user settings
//! - The superloop runtime tying it together

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod boot;
pub mod config;
pub mod diagnostics;
pub mod identity;
pub mod lifecycle;
pub mod runtime;
pub mod supervisor;

pub use boot::{BootOutcome, BootReport, PowerEvent, PowerState};
pub use config::{BoardConfig, BoardVariant, Settings};
pub use runtime::{Runtime, Startup};
