//! Boot/power state machine
//!
//! Startup path and shutdown handling are a function of the current state
//! and an event. Anything not listed leaves the state unchanged.

use super::events::PowerEvent;
use aerotrack_hal::BootAction;

/// Power states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Reset vector reached, boot action not yet consumed
    #[default]
    Boot,
    /// Waiting in low power for serial activity
    SerialDeepSleep,
    /// Bringing peripherals up
    Starting,
    /// Superloop running
    Running,
    /// Finalizing peripherals ahead of a reset
    ShuttingDown,
    /// Lowest-power halt; only an external reset leaves it
    Halted,
}

impl PowerState {
    /// Check if peripherals may be touched in this state
    ///
    /// The serial wake transport is the only exception, and it is owned by
    /// the power backend.
    pub fn peripherals_allowed(&self) -> bool {
        matches!(self, PowerState::Starting | PowerState::Running)
    }

    /// Check if the watchdog must be serviced in this state
    pub fn watchdog_serviced(&self) -> bool {
        matches!(self, PowerState::Running)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PowerEvent) -> Self {
        use PowerEvent::*;
        use PowerState::*;

        match (self, event) {
            (Boot, ActionLoaded(BootAction::Normal)) => Starting,
            (Boot, ActionLoaded(BootAction::SerialDeepSleep)) => SerialDeepSleep,
            (Boot, ActionLoaded(BootAction::Shutdown)) => Halted,

            (SerialDeepSleep, Woke) => Starting,

            (Starting, SetupComplete) => Running,
            (Starting, ShutdownRequested) => ShuttingDown,

            (Running, ShutdownRequested) => ShuttingDown,
            (Running, ResetIssued) => Boot,

            (ShuttingDown, ResetIssued) => Boot,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_boot_path() {
        let state = PowerState::Boot
            .transition(PowerEvent::ActionLoaded(BootAction::Normal))
            .transition(PowerEvent::SetupComplete);
        assert_eq!(state, PowerState::Running);
        assert!(state.watchdog_serviced());
    }

    #[test]
    fn test_serial_deep_sleep_path() {
        let sleeping =
            PowerState::Boot.transition(PowerEvent::ActionLoaded(BootAction::SerialDeepSleep));
        assert_eq!(sleeping, PowerState::SerialDeepSleep);
        assert!(!sleeping.peripherals_allowed());
        assert_eq!(sleeping.transition(PowerEvent::Woke), PowerState::Starting);
    }

    #[test]
    fn test_shutdown_action_halts() {
        let state = PowerState::Boot.transition(PowerEvent::ActionLoaded(BootAction::Shutdown));
        assert_eq!(state, PowerState::Halted);

        // Nothing leaves Halted from software
        for event in [
            PowerEvent::Woke,
            PowerEvent::SetupComplete,
            PowerEvent::ShutdownRequested,
            PowerEvent::ResetIssued,
        ] {
            assert_eq!(state.transition(event), PowerState::Halted);
        }
    }

    #[test]
    fn test_shutdown_request_returns_to_boot() {
        let state = PowerState::Running
            .transition(PowerEvent::ShutdownRequested)
            .transition(PowerEvent::ResetIssued);
        assert_eq!(state, PowerState::Boot);
    }

    #[test]
    fn test_action_ignored_after_boot() {
        let state = PowerState::Running.transition(PowerEvent::ActionLoaded(BootAction::Shutdown));
        assert_eq!(state, PowerState::Running);
    }
}
