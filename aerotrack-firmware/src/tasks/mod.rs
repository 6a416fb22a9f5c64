//! Background tasks
//!
//! The superloop in `main` owns the platform. Tasks here only publish into
//! lock-free cells the platform reads.

mod battery;
mod pps;

pub use battery::{battery_task, BATTERY_SAMPLE_INTERVAL_MS};
pub use pps::pps_task;
