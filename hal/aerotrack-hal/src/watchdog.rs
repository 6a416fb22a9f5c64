//! Hardware watchdog abstraction

/// Hardware watchdog timer
///
/// Once armed, some targets cannot disable the watchdog again.
/// [`WatchdogOps::finalize`] then stretches the timeout to its maximum
/// instead.
pub trait WatchdogOps {
    /// Arm the watchdog with the given timeout in microseconds
    fn setup(&mut self, timeout_us: u32);

    /// Service the watchdog
    fn reload(&mut self);

    /// Check if the watchdog has been armed
    fn is_enabled(&self) -> bool;

    /// Best-effort suspension ahead of a deliberate reset
    fn finalize(&mut self);
}
