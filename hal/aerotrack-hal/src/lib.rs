//! Aerotrack Hardware Abstraction Layer
//!
//! This crate defines the capability table every hardware target must
//! implement. Upper layers (protocol codecs, display, navigation) only see
//! the [`Platform`] trait, so the same application runs unmodified on any
//! backend that satisfies it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  aerotrack-firmware / application code  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aerotrack-core (boot, lifecycle, ...)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aerotrack-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ aerotrack-hal-│       │ aerotrack-hal-│
//! │     stm32     │       │     host      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`Platform`] - The capability table itself
//! - [`BootStage`] - The parts the boot protocol runs on, before any driver exists
//! - [`Lifecycle`] - Uniform setup/poll/finalize triad for managed peripherals
//! - [`BootStore`] - Retained-memory registers used by the boot logic
//! - [`ResetCauseRegister`] - Raw reset-cause flags
//! - [`WatchdogOps`], [`PowerOps`] - Supervision and low-power control
//!
//! Optional capabilities are returned as [`Capability`]; a target that lacks
//! one names [`Absent`] as the associated type, so the compiler rejects any
//! attempt to drive it.

#![no_std]
#![deny(unsafe_code)]

pub mod boot;
pub mod capability;
pub mod network;
pub mod peripheral;
pub mod platform;
pub mod power;
pub mod reset;
pub mod sensor;
pub mod spi;
pub mod storage;
pub mod timing;
pub mod uart;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use boot::{BootAction, BootIndex, BootStore};
pub use capability::{Absent, Capability};
pub use network::NetworkOps;
pub use peripheral::{
    BatteryOps, ButtonOps, DisplayKind, DisplayOps, Lifecycle, NoDisplay, Noop, SoundOps, Tone,
    SELF_TEST_MELODY,
};
pub use platform::{BootStage, Platform, PlatformContext, PlatformId};
pub use power::PowerOps;
pub use reset::{ResetCauseRegister, ResetFlags, ResetInfo, ResetReason};
pub use sensor::{BaroOps, GnssOps};
pub use spi::SpiOps;
pub use storage::{EepromError, EepromOps};
pub use timing::TimeMarker;
pub use uart::{IoDevice, SerialOps, UatOps};
pub use watchdog::WatchdogOps;
