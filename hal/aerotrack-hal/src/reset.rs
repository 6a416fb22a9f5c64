//! Reset-cause vocabulary
//!
//! Backends expose the raw hardware reset flags as [`ResetFlags`] through a
//! [`ResetCauseRegister`]. The core decodes them into exactly one
//! [`ResetReason`] and clears the register once per boot.

bitflags::bitflags! {
    /// Raw reset-cause flags as latched by the reset controller
    ///
    /// Several flags may be set at once; the hardware keeps them across
    /// resets until they are explicitly cleared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ResetFlags: u8 {
        /// Illegal low-power mode entry
        const LOW_POWER = 1 << 0;
        /// Window watchdog expired
        const WINDOW_WATCHDOG = 1 << 1;
        /// Independent watchdog expired
        const INDEPENDENT_WATCHDOG = 1 << 2;
        /// Software-requested system reset
        const SOFTWARE = 1 << 3;
        /// Power-on or power-down reset
        const POWER_ON = 1 << 4;
        /// External reset pin asserted
        const EXTERNAL_PIN = 1 << 5;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ResetFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ResetFlags({=u8:#x})", self.bits())
    }
}

/// Canonical reason for the last reset
///
/// Numeric values are stable and form part of the external interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ResetReason {
    /// Normal power-on, or no flag latched
    #[default]
    Default = 0,
    /// Hardware watchdog timeout
    WatchdogTimeout = 1,
    /// Fatal exception
    Exception = 2,
    /// Software (independent) watchdog timeout
    SoftwareWatchdog = 3,
    /// Deliberate software restart
    SoftwareRestart = 4,
    /// Wake from deep sleep
    DeepSleepWake = 5,
    /// External reset signal
    ExternalPin = 6,
    /// Anything the vocabulary does not cover
    Unknown = 7,
}

impl ResetReason {
    /// Get the reason as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a reason from a byte value
    ///
    /// Values outside the vocabulary map to [`ResetReason::Unknown`].
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ResetReason::Default,
            1 => ResetReason::WatchdogTimeout,
            2 => ResetReason::Exception,
            3 => ResetReason::SoftwareWatchdog,
            4 => ResetReason::SoftwareRestart,
            5 => ResetReason::DeepSleepWake,
            6 => ResetReason::ExternalPin,
            _ => ResetReason::Unknown,
        }
    }

    /// Fixed human-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            ResetReason::Default => "DEFAULT",
            ResetReason::WatchdogTimeout => "WDT",
            ResetReason::Exception => "EXCEPTION",
            ResetReason::SoftwareWatchdog => "SOFT_WDT",
            ResetReason::SoftwareRestart => "SOFT_RESTART",
            ResetReason::DeepSleepWake => "DEEP_SLEEP_AWAKE",
            ResetReason::ExternalPin => "EXT_SYS",
            ResetReason::Unknown => "NO_MEAN",
        }
    }

    /// Check if a watchdog (of either kind) caused the reset
    pub fn is_watchdog(self) -> bool {
        matches!(
            self,
            ResetReason::WatchdogTimeout | ResetReason::SoftwareWatchdog
        )
    }
}

impl core::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reset record for the current boot session
///
/// Populated once from the hardware flags and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResetInfo {
    /// Decoded reason
    pub reason: ResetReason,
    /// Raw flags observed before clearing
    pub flags: ResetFlags,
}

/// Hardware register holding the reset-cause flags
pub trait ResetCauseRegister {
    /// Read the currently latched flags
    fn read(&mut self) -> ResetFlags;

    /// Clear every latched flag
    ///
    /// Without this the next boot would see stale flags from earlier resets.
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(ResetReason::Default.as_str(), "DEFAULT");
        assert_eq!(ResetReason::WatchdogTimeout.as_str(), "WDT");
        assert_eq!(ResetReason::SoftwareWatchdog.as_str(), "SOFT_WDT");
        assert_eq!(ResetReason::ExternalPin.as_str(), "EXT_SYS");
        assert_eq!(ResetReason::Unknown.as_str(), "NO_MEAN");
    }

    #[test]
    fn test_reason_numeric_roundtrip() {
        for value in 0..=6u8 {
            assert_eq!(ResetReason::from_u8(value).as_u8(), value);
        }
        assert_eq!(ResetReason::from_u8(42), ResetReason::Unknown);
    }

    #[test]
    fn test_watchdog_reasons() {
        assert!(ResetReason::WatchdogTimeout.is_watchdog());
        assert!(ResetReason::SoftwareWatchdog.is_watchdog());
        assert!(!ResetReason::SoftwareRestart.is_watchdog());
    }
}
