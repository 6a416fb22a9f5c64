//! Supervision of the running superloop

pub mod watchdog;

pub use watchdog::{WatchdogSupervisor, DEFAULT_TIMEOUT_US};
