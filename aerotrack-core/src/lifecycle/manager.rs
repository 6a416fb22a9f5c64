//! Peripheral lifecycle manager
//!
//! Brings every managed peripheral up in a fixed order, services them from
//! the superloop, and quiesces them before a deliberate reset. Optional
//! transports are skipped through [`Capability`]; everything else is
//! always present, possibly as a no-op.

use aerotrack_hal::spi::SpiConfig;
use aerotrack_hal::{
    BaroOps, Capability, DisplayKind, DisplayOps, EepromError, EepromOps, IoDevice, Lifecycle,
    Platform, SerialOps, SpiOps, UatOps,
};

use crate::config::{BoardConfig, Settings, SettingsError};

/// What peripheral setup found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralReport {
    /// Display detected
    pub display: DisplayKind,
    /// EEPROM open status
    pub eeprom: Result<(), EepromError>,
    /// Barometric sensor bus ready
    pub baro: bool,
    /// IO device (USB serial) present
    pub io_device: bool,
    /// Bluetooth present
    pub bluetooth: bool,
    /// Output routes were rewritten for missing transports
    pub routes_adapted: bool,
}

impl PeripheralReport {
    /// Check if settings could be persisted this boot
    pub fn eeprom_ok(&self) -> bool {
        self.eeprom.is_ok()
    }
}

/// Bring every managed peripheral up
///
/// An EEPROM that cannot hold the requested region is not fatal: the
/// defaults in `settings` stay in RAM and nothing is written.
pub fn setup_all<P: Platform>(
    platform: &mut P,
    board: &BoardConfig,
    settings: &mut Settings,
) -> PeripheralReport {
    platform.battery().setup();
    platform.button().setup();

    let has_bluetooth = platform.bluetooth().is_supported();
    let has_usb = platform.io_device().is_supported();

    let eeprom = platform.eeprom().begin(board.eeprom_size);
    let mut routes_adapted = false;
    match eeprom {
        Ok(()) => {
            *settings = load_settings(platform.eeprom());
            routes_adapted = settings.adapt_to_transports(has_bluetooth, has_usb);
            if routes_adapted {
                info!("bluetooth routes redirected, usb present: {}", has_usb);
            }
        }
        Err(e) => {
            warn!("EEPROM unavailable ({:?}), running on defaults", e);
        }
    }

    platform.spi().begin(SpiConfig::default());
    platform.serial().begin(board.gnss_baud);
    platform.uat().begin(board.uat_baud);

    let display = platform.display().setup();

    if let Capability::Supported(io) = platform.io_device() {
        io.setup();
        debug!("IO device {} up", io.name());
    }
    if let Capability::Supported(bt) = platform.bluetooth() {
        bt.setup();
    }

    let baro = platform.baro().setup();

    PeripheralReport {
        display,
        eeprom,
        baro,
        io_device: has_usb,
        bluetooth: has_bluetooth,
        routes_adapted,
    }
}

fn load_settings<E: EepromOps>(eeprom: &mut E) -> Settings {
    match Settings::load(eeprom) {
        Ok(settings) => settings,
        Err(SettingsError::Blank) | Err(SettingsError::Corrupt) => {
            info!("settings region empty or invalid, writing defaults");
            let defaults = Settings::default();
            if let Err(e) = defaults.store(eeprom) {
                warn!("failed to store default settings: {:?}", e);
            }
            defaults
        }
        Err(e) => {
            warn!("failed to load settings: {:?}", e);
            Settings::default()
        }
    }
}

/// Service every managed peripheral once
pub fn poll_all<P: Platform>(platform: &mut P) {
    platform.display().poll();
    platform.battery().poll();
    platform.button().poll();
    platform.io_device().with(|io| io.poll());
    platform.bluetooth().with(|bt| bt.poll());
}

/// Quiesce every managed peripheral
///
/// The display shows `message` before it goes dark.
pub fn finalize_all<P: Platform>(platform: &mut P, message: &str) {
    let display = platform.display();
    display.farewell(message);
    display.finalize();

    platform.button().finalize();
    platform.io_device().with(|io| io.finalize());
    platform.bluetooth().with(|bt| bt.finalize());
    platform.battery().finalize();

    platform.serial().end();
    platform.spi().end();
}
