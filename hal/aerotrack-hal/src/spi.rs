//! SPI bus bring-up
//!
//! Transfers are owned by the radio driver; the capability table only
//! claims and releases the bus pins.

/// SPI bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
        }
    }
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Clock idles high
    pub fn idle_high(self) -> bool {
        matches!(self, Mode::Mode2 | Mode::Mode3)
    }

    /// Data captured on the second clock transition
    pub fn capture_on_second(self) -> bool {
        matches!(self, Mode::Mode1 | Mode::Mode3)
    }
}

/// SPI bus owner
///
/// Slave select is driven by the device driver, not by the bus.
pub trait SpiOps {
    /// Route the bus pins and enable the peripheral
    fn begin(&mut self, config: SpiConfig);

    /// Release the bus
    fn end(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_bits() {
        assert!(!Mode::Mode0.idle_high());
        assert!(!Mode::Mode0.capture_on_second());
        assert!(Mode::Mode3.idle_high());
        assert!(Mode::Mode3.capture_on_second());
        assert!(Mode::Mode1.capture_on_second());
    }
}
