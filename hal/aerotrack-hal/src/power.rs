//! Low-power mode control
//!
//! The serial deep-sleep path is split into three steps so the boot logic
//! can rewrite the boot action between arming the wake source and actually
//! suspending.

/// Low-power entry points
pub trait PowerOps {
    /// Bring up the minimal wake transport and route its activity to wake-up
    fn arm_serial_wake(&mut self);

    /// Suspend until the wake transport sees activity
    fn deep_sleep(&mut self);

    /// Discard whatever woke the device
    fn drain_wake_transport(&mut self);

    /// Enter the lowest-power halt
    ///
    /// Does not return on hardware; only an external reset recovers.
    fn power_off(&mut self);
}
