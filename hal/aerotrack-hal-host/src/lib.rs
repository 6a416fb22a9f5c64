//! Simulated Aerotrack backend
//!
//! Implements the full capability table over a simulated board so that the
//! boot protocol, reset diagnostics, watchdog and lifecycle can be exercised
//! on the host. Retained registers, latched reset flags and the EEPROM
//! survive simulated resets exactly as they would on hardware; RAM-held
//! state does not.
//!
//! ```no_run
//! use aerotrack_core::config::BoardVariant;
//! use aerotrack_core::{Runtime, Startup};
//! use aerotrack_hal_host::{HostBoot, HostPlatform, SimBoard};
//!
//! let board = SimBoard::default();
//! if let Startup::Running(mut runtime) = Runtime::boot(
//!     HostBoot::new(&board),
//!     BoardVariant::TMotion11.config(),
//!     HostPlatform::assemble,
//! ) {
//!     runtime.tick();
//!     runtime.shutdown("BYE");
//!     board.reboot();
//! }
//! ```

pub mod board;
pub mod devices;
pub mod platform;

pub use board::{Peripheral, SimBoard, SimConfig, SimEvent, SimRam, WatchdogKind};
pub use platform::{HostBoot, HostPlatform, HOST_PLATFORM};
