//! Boot/power state machine
//!
//! The boot action persisted in the boot store decides which startup path
//! a boot takes. It is read exactly once, before any peripheral is set up.

pub mod events;
pub mod machine;
pub mod sequence;
pub mod store;

pub use events::PowerEvent;
pub use machine::PowerState;
pub use sequence::{cold_boot, BootOutcome, BootReport};
