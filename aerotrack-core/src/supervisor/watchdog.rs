//! Watchdog supervision
//!
//! The superloop must reload the watchdog on every iteration once it is
//! armed. A missed deadline resets the device and shows up as a watchdog
//! reason in the next boot's reset diagnostics.

use aerotrack_hal::WatchdogOps;

/// Default watchdog timeout (5 s)
pub const DEFAULT_TIMEOUT_US: u32 = 5_000_000;

/// Watchdog supervisor
#[derive(Debug, Clone)]
pub struct WatchdogSupervisor {
    /// Configured timeout in microseconds
    timeout_us: u32,
    /// Reloads issued since arming
    reloads: u32,
    /// Suspended ahead of a deliberate reset
    suspended: bool,
}

impl Default for WatchdogSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_US)
    }
}

impl WatchdogSupervisor {
    /// Create a supervisor for the given timeout
    pub fn new(timeout_us: u32) -> Self {
        Self {
            timeout_us,
            reloads: 0,
            suspended: false,
        }
    }

    /// Arm the hardware watchdog
    pub fn arm<W: WatchdogOps>(&mut self, watchdog: &mut W) {
        watchdog.setup(self.timeout_us);
        self.reloads = 0;
        self.suspended = false;
        info!("watchdog armed, timeout {} us", self.timeout_us);
    }

    /// Service the watchdog if it is armed
    ///
    /// Returns `true` when a reload was issued.
    pub fn service<W: WatchdogOps>(&mut self, watchdog: &mut W) -> bool {
        if self.suspended || !watchdog.is_enabled() {
            return false;
        }
        watchdog.reload();
        self.reloads = self.reloads.wrapping_add(1);
        true
    }

    /// Suspend supervision ahead of a deliberate reset
    pub fn suspend<W: WatchdogOps>(&mut self, watchdog: &mut W) {
        if watchdog.is_enabled() {
            watchdog.finalize();
            debug!("watchdog suspended");
        }
        self.suspended = true;
    }

    /// Configured timeout in microseconds
    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Reloads issued since arming
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Check if supervision was suspended
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockWatchdog {
        timeout_us: Option<u32>,
        reloads: u32,
        finalized: bool,
    }

    impl WatchdogOps for MockWatchdog {
        fn setup(&mut self, timeout_us: u32) {
            self.timeout_us = Some(timeout_us);
        }

        fn reload(&mut self) {
            self.reloads += 1;
        }

        fn is_enabled(&self) -> bool {
            self.timeout_us.is_some()
        }

        fn finalize(&mut self) {
            self.finalized = true;
        }
    }

    #[test]
    fn test_service_before_arm_is_noop() {
        let mut wd = MockWatchdog::default();
        let mut supervisor = WatchdogSupervisor::default();
        assert!(!supervisor.service(&mut wd));
        assert_eq!(wd.reloads, 0);
    }

    #[test]
    fn test_arm_and_service() {
        let mut wd = MockWatchdog::default();
        let mut supervisor = WatchdogSupervisor::default();
        supervisor.arm(&mut wd);
        assert_eq!(wd.timeout_us, Some(DEFAULT_TIMEOUT_US));

        assert!(supervisor.service(&mut wd));
        assert!(supervisor.service(&mut wd));
        assert_eq!(wd.reloads, 2);
        assert_eq!(supervisor.reloads(), 2);
    }

    #[test]
    fn test_suspend_stops_service() {
        let mut wd = MockWatchdog::default();
        let mut supervisor = WatchdogSupervisor::new(1_000_000);
        supervisor.arm(&mut wd);
        supervisor.suspend(&mut wd);

        assert!(wd.finalized);
        assert!(supervisor.is_suspended());
        assert!(!supervisor.service(&mut wd));
    }

    #[test]
    fn test_suspend_unarmed_skips_finalize() {
        let mut wd = MockWatchdog::default();
        let mut supervisor = WatchdogSupervisor::default();
        supervisor.suspend(&mut wd);
        assert!(!wd.finalized);
    }
}
