//! Managed peripheral operation groups
//!
//! Every managed subsystem follows the same setup/poll/finalize triad
//! expressed by [`Lifecycle`]. Hardware a target lacks is represented by a
//! no-op implementation ([`Noop`], [`NoDisplay`]) rather than by omission,
//! so the lifecycle manager never special-cases a missing peripheral.

/// Uniform lifecycle triad for a managed peripheral
pub trait Lifecycle {
    /// Status reported by [`Lifecycle::setup`]
    type Status;

    /// Bring the peripheral up
    fn setup(&mut self) -> Self::Status;

    /// Service the peripheral from the superloop
    fn poll(&mut self) {}

    /// Quiesce the peripheral before a deliberate reset
    fn finalize(&mut self) {}
}

/// Kind of display detected during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayKind {
    /// No display fitted
    #[default]
    None,
    /// Monochrome OLED panel
    Oled,
    /// E-paper panel
    EPaper,
    /// Color TFT panel
    Tft,
}

/// Battery monitor
pub trait BatteryOps: Lifecycle<Status = ()> {
    /// Battery voltage in volts
    fn voltage(&mut self) -> f32;
}

/// Physical push button
pub trait ButtonOps: Lifecycle<Status = ()> {}

/// Display panel
pub trait DisplayOps: Lifecycle<Status = DisplayKind> {
    /// Show a final message before the panel is finalized
    fn farewell(&mut self, message: &str) {
        let _ = message;
    }
}

/// One note of a buzzer melody
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    /// Frequency in Hz
    pub hz: u32,
    /// Time the note sounds, in ms
    pub duration_ms: u32,
    /// Time until the next note starts, in ms
    pub gap_ms: u32,
}

/// Buzzer self-test melody
pub const SELF_TEST_MELODY: [Tone; 4] = [
    Tone {
        hz: 440,
        duration_ms: 500,
        gap_ms: 500,
    },
    Tone {
        hz: 640,
        duration_ms: 500,
        gap_ms: 500,
    },
    Tone {
        hz: 840,
        duration_ms: 500,
        gap_ms: 500,
    },
    Tone {
        hz: 1040,
        duration_ms: 500,
        gap_ms: 600,
    },
];

/// Buzzer
pub trait SoundOps {
    /// Play the self-test melody
    ///
    /// The volume gate lives with the caller; this always plays.
    fn play_test(&mut self, variant: u8);
}

/// No-op implementation for absent peripherals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Noop;

impl Lifecycle for Noop {
    type Status = ();

    fn setup(&mut self) {}
}

impl BatteryOps for Noop {
    fn voltage(&mut self) -> f32 {
        0.0
    }
}

impl ButtonOps for Noop {}

impl SoundOps for Noop {
    fn play_test(&mut self, _variant: u8) {}
}

/// Display slot for targets without a panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDisplay;

impl Lifecycle for NoDisplay {
    type Status = DisplayKind;

    fn setup(&mut self) -> DisplayKind {
        DisplayKind::None
    }
}

impl DisplayOps for NoDisplay {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_peripherals() {
        let mut noop = Noop;
        noop.setup();
        noop.poll();
        noop.finalize();
        assert_eq!(noop.voltage(), 0.0);
    }

    #[test]
    fn test_no_display_reports_none() {
        let mut display = NoDisplay;
        assert_eq!(display.setup(), DisplayKind::None);
        display.farewell("bye");
    }
}
