//! Nonvolatile boot store abstractions
//!
//! A tiny register file in a retained-memory domain (e.g. RTC backup
//! registers). It survives a system reset but not a full power removal.
//! Only two indices carry meaning; they are fixed by convention.

/// Retained register indices used by the boot logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BootIndex {
    /// Monotonic boot counter (diagnostics only)
    Counter = 1,
    /// One-shot boot action directive
    Action = 2,
}

impl BootIndex {
    /// Get the index as a register number
    pub fn as_usize(self) -> usize {
        self as usize
    }
}

/// Directive read once at the start of every boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum BootAction {
    /// Ordinary startup
    #[default]
    Normal = 0,
    /// Wait in low power until the wake transport sees activity
    SerialDeepSleep = 1,
    /// Lowest-power halt; only an external reset recovers
    Shutdown = 2,
}

impl BootAction {
    /// Get the stored register value
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decode a stored register value
    ///
    /// Returns `None` for values outside the vocabulary.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(BootAction::Normal),
            1 => Some(BootAction::SerialDeepSleep),
            2 => Some(BootAction::Shutdown),
            _ => None,
        }
    }
}

/// Retained-memory register file
///
/// Writes must complete synchronously: callers issue a reset immediately
/// after a write returns.
pub trait BootStore {
    /// Read a retained register
    fn read(&mut self, index: BootIndex) -> u32;

    /// Write a retained register
    fn write(&mut self, index: BootIndex, value: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_action_values() {
        assert_eq!(BootAction::Normal.as_u32(), 0);
        assert_eq!(BootAction::from_u32(1), Some(BootAction::SerialDeepSleep));
        assert_eq!(BootAction::from_u32(2), Some(BootAction::Shutdown));
        assert_eq!(BootAction::from_u32(0xDEAD_BEEF), None);
    }

    #[test]
    fn test_indices_distinct() {
        assert_ne!(BootIndex::Counter.as_usize(), BootIndex::Action.as_usize());
    }
}
