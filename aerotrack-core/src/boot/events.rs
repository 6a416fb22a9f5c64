//! Events that drive power-state transitions

use aerotrack_hal::BootAction;

/// Events that can trigger power-state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Stored boot action read from the boot store
    ActionLoaded(BootAction),
    /// Wake transport saw activity
    Woke,
    /// Every peripheral is up and the watchdog is armed
    SetupComplete,
    /// Application asked to power down
    ShutdownRequested,
    /// Hardware reset issued
    ResetIssued,
}
