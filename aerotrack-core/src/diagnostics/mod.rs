//! Post-mortem diagnostics
//!
//! Why the device last reset, and how much memory headroom is left.

pub mod memory;
pub mod reset;

pub use memory::{estimate_free, MemorySnapshot};
pub use reset::{capture, decode, ResetRule, RESET_RULES};
