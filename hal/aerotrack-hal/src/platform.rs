//! The capability table
//!
//! [`Platform`] is implemented once per hardware target and selected at
//! build time. Mandatory operations are plain methods; optional ones return
//! [`Capability`], so a caller has to handle absence before it can reach the
//! operation at all.
//!
//! Startup is split in two. A [`BootStage`] holds only what the boot
//! protocol may touch before the stored boot action has been handled: the
//! reset-cause register, the retained boot registers and low-power control.
//! The full [`Platform`] is assembled from it afterwards, so no other
//! peripheral exists while the device may still go back to sleep.
//!
//! Per-boot mutable state (reset record, boot count) lives in a
//! [`PlatformContext`] owned by the boot stage. There is no file-scope
//! mutable state.

use crate::boot::BootStore;
use crate::capability::Capability;
use crate::network::NetworkOps;
use crate::peripheral::{BatteryOps, ButtonOps, DisplayOps, SoundOps};
use crate::power::PowerOps;
use crate::reset::{ResetCauseRegister, ResetInfo, ResetReason};
use crate::sensor::{BaroOps, GnssOps};
use crate::spi::SpiOps;
use crate::storage::EepromOps;
use crate::uart::{IoDevice, SerialOps, UatOps};
use crate::watchdog::WatchdogOps;

/// Detail string for targets that report nothing beyond the reason
pub const NO_RESET_DETAILS: &str = "No reset information available";

/// Target identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlatformId {
    /// Numeric target id
    pub code: u8,
    /// Human-readable target name
    pub name: &'static str,
}

/// Per-boot platform state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlatformContext {
    reset: Option<ResetInfo>,
    boot_count: u32,
}

impl PlatformContext {
    /// Create an empty context
    pub const fn new() -> Self {
        Self {
            reset: None,
            boot_count: 0,
        }
    }

    /// Record the reset info for this boot
    ///
    /// Only the first call takes effect; returns `false` if a record was
    /// already present.
    pub fn record_reset(&mut self, info: ResetInfo) -> bool {
        if self.reset.is_some() {
            return false;
        }
        self.reset = Some(info);
        true
    }

    /// Reset info recorded this boot, if diagnostics have run
    pub fn reset_info(&self) -> Option<ResetInfo> {
        self.reset
    }

    /// Reason for the last reset (Default until diagnostics have run)
    pub fn reset_reason(&self) -> ResetReason {
        self.reset.map(|info| info.reason).unwrap_or_default()
    }

    /// Record the boot counter value for this boot
    pub fn set_boot_count(&mut self, count: u32) {
        self.boot_count = count;
    }

    /// Boot counter value for this boot
    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }
}

/// Parts available before the boot action is handled
pub trait BootStage {
    /// Reset-cause flag register
    type ResetCause: ResetCauseRegister;
    /// Retained boot registers
    type BootStore: BootStore;
    /// Low-power control, including the serial wake transport
    type Power: PowerOps;

    /// Per-boot state
    fn context(&self) -> &PlatformContext;

    /// Per-boot state, mutably
    fn context_mut(&mut self) -> &mut PlatformContext;

    /// Reset-cause flag register
    fn reset_cause(&mut self) -> &mut Self::ResetCause;

    /// Retained boot registers
    fn boot_store(&mut self) -> &mut Self::BootStore;

    /// Low-power control
    fn power(&mut self) -> &mut Self::Power;
}

/// Hardware target capability table
///
/// `reset` and `power_off` do not return on real hardware. They return
/// normally on simulated targets so that a following boot can be driven by
/// the caller.
pub trait Platform {
    /// Early boot parts this platform was assembled from
    type Boot: BootStage;
    /// Hardware watchdog
    type Watchdog: WatchdogOps;
    /// Buzzer
    type Sound: SoundOps;
    /// Alternate network transport
    type Network: NetworkOps;
    /// Settings EEPROM
    type Eeprom: EepromOps;
    /// SPI bus
    type Spi: SpiOps;
    /// Secondary serial port
    type Serial: SerialOps;
    /// Bluetooth byte stream (optional)
    type Bluetooth: IoDevice;
    /// Pluggable IO device, e.g. USB serial (optional)
    type IoDevice: IoDevice;
    /// Display panel
    type Display: DisplayOps;
    /// Battery monitor
    type Battery: BatteryOps;
    /// Satellite timing hooks
    type Gnss: GnssOps;
    /// Barometric sensor
    type Baro: BaroOps;
    /// Auxiliary UAT port
    type Uat: UatOps;
    /// Push button
    type Button: ButtonOps;

    /// Target identity
    fn identity(&self) -> PlatformId;

    /// Board-level initialization, run after the boot action was handled
    fn setup(&mut self);

    /// Late initialization once every peripheral is up
    fn post_init(&mut self) {}

    /// Board-level superloop hook
    fn poll(&mut self) {}

    /// Board-level quiescing before a deliberate reset
    fn finalize(&mut self) {}

    /// Issue a system reset
    fn reset(&mut self);

    /// Derived device identifier
    fn chip_id(&self) -> u32;

    /// Early boot parts
    fn boot_stage(&self) -> &Self::Boot;

    /// Early boot parts, mutably
    fn boot_stage_mut(&mut self) -> &mut Self::Boot;

    /// Per-boot state
    fn context(&self) -> &PlatformContext {
        self.boot_stage().context()
    }

    /// Free-text reset detail
    fn reset_details(&self) -> &'static str {
        NO_RESET_DETAILS
    }

    /// Reason for the last reset
    fn reset_reason(&self) -> ResetReason {
        self.context().reset_reason()
    }

    /// Approximate free memory in bytes
    fn free_heap(&self) -> u32;

    /// Pseudo-random value in `[low, high)`; an empty range yields `low`
    fn random(&mut self, low: i32, high: i32) -> i32;

    /// Hardware watchdog
    fn watchdog(&mut self) -> &mut Self::Watchdog;

    /// Buzzer
    fn sound(&mut self) -> &mut Self::Sound;

    /// Alternate network transport
    fn network(&mut self) -> &mut Self::Network;

    /// Settings EEPROM
    fn eeprom(&mut self) -> &mut Self::Eeprom;

    /// SPI bus
    fn spi(&mut self) -> &mut Self::Spi;

    /// Secondary serial port
    fn serial(&mut self) -> &mut Self::Serial;

    /// Bluetooth byte stream, if the target has one
    fn bluetooth(&mut self) -> Capability<&mut Self::Bluetooth>;

    /// Pluggable IO device, if the target has one
    fn io_device(&mut self) -> Capability<&mut Self::IoDevice>;

    /// Display panel
    fn display(&mut self) -> &mut Self::Display;

    /// Battery monitor
    fn battery(&mut self) -> &mut Self::Battery;

    /// Satellite timing hooks
    fn gnss(&self) -> &Self::Gnss;

    /// Barometric sensor
    fn baro(&mut self) -> &mut Self::Baro;

    /// Auxiliary UAT port
    fn uat(&mut self) -> &mut Self::Uat;

    /// Push button
    fn button(&mut self) -> &mut Self::Button;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reset::ResetFlags;

    #[test]
    fn test_context_reset_is_write_once() {
        let mut ctx = PlatformContext::new();
        assert_eq!(ctx.reset_reason(), ResetReason::Default);
        assert!(ctx.reset_info().is_none());

        let first = ResetInfo {
            reason: ResetReason::SoftwareRestart,
            flags: ResetFlags::SOFTWARE,
        };
        assert!(ctx.record_reset(first));
        assert!(!ctx.record_reset(ResetInfo {
            reason: ResetReason::ExternalPin,
            flags: ResetFlags::EXTERNAL_PIN,
        }));
        assert_eq!(ctx.reset_info(), Some(first));
        assert_eq!(ctx.reset_reason(), ResetReason::SoftwareRestart);
    }

    #[test]
    fn test_context_boot_count() {
        let mut ctx = PlatformContext::new();
        ctx.set_boot_count(7);
        assert_eq!(ctx.boot_count(), 7);
    }
}
