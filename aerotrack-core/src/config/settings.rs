//! User settings
//!
//! Settings are stored in the EEPROM as postcard binary data behind a
//! two-byte header (magic, payload length).

use aerotrack_hal::{EepromError, EepromOps};
use serde::{Deserialize, Serialize};

/// Header magic marking an initialized settings region
pub const SETTINGS_MAGIC: u8 = 0xA7;

const HEADER_LEN: usize = 2;

/// Largest encoded payload accepted
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Buzzer volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Volume {
    Off,
    Low,
    Full,
}

/// Where a data stream is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputRoute {
    Off,
    Uart,
    Usb,
    Udp,
    Tcp,
    Bluetooth,
}

impl OutputRoute {
    /// Replacement route when the platform lacks Bluetooth
    ///
    /// Bluetooth falls back to USB when the platform has a USB serial
    /// device, otherwise to the UART. Other routes are kept.
    pub fn without_bluetooth(self, has_usb: bool) -> Self {
        match self {
            OutputRoute::Bluetooth if has_usb => OutputRoute::Usb,
            OutputRoute::Bluetooth => OutputRoute::Uart,
            other => other,
        }
    }
}

/// Errors from loading or storing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// EEPROM access failed
    Eeprom(EepromError),
    /// Region has never been written
    Blank,
    /// Header or payload is invalid
    Corrupt,
    /// Settings did not fit the payload buffer
    Encode,
}

impl From<EepromError> for SettingsError {
    fn from(e: EepromError) -> Self {
        SettingsError::Eeprom(e)
    }
}

/// Runtime user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub volume: Volume,
    pub nmea_out: OutputRoute,
    pub gdl90_out: OutputRoute,
    pub d1090_out: OutputRoute,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: Volume::Full,
            nmea_out: OutputRoute::Uart,
            gdl90_out: OutputRoute::Off,
            d1090_out: OutputRoute::Off,
        }
    }
}

impl Settings {
    /// Rewrite Bluetooth routes the platform cannot serve
    ///
    /// Returns `true` if any route changed.
    pub fn adapt_to_transports(&mut self, has_bluetooth: bool, has_usb: bool) -> bool {
        if has_bluetooth {
            return false;
        }

        let before = *self;
        self.nmea_out = self.nmea_out.without_bluetooth(has_usb);
        self.gdl90_out = self.gdl90_out.without_bluetooth(has_usb);
        self.d1090_out = self.d1090_out.without_bluetooth(has_usb);
        *self != before
    }

    /// Load settings from an opened EEPROM region
    pub fn load<E: EepromOps>(eeprom: &mut E) -> Result<Self, SettingsError> {
        let mut header = [0u8; HEADER_LEN];
        eeprom.read(0, &mut header)?;

        match header {
            [SETTINGS_MAGIC, len] if (len as usize) <= MAX_PAYLOAD_LEN => {
                let mut payload = [0u8; MAX_PAYLOAD_LEN];
                let payload = &mut payload[..len as usize];
                eeprom.read(HEADER_LEN, payload)?;
                postcard::from_bytes(payload).map_err(|_| SettingsError::Corrupt)
            }
            [0x00, 0x00] | [0xFF, 0xFF] => Err(SettingsError::Blank),
            _ => Err(SettingsError::Corrupt),
        }
    }

    /// Store settings into an opened EEPROM region
    pub fn store<E: EepromOps>(&self, eeprom: &mut E) -> Result<(), SettingsError> {
        let mut buf = [0u8; HEADER_LEN + MAX_PAYLOAD_LEN];
        let len = postcard::to_slice(self, &mut buf[HEADER_LEN..])
            .map_err(|_| SettingsError::Encode)?
            .len();

        buf[0] = SETTINGS_MAGIC;
        buf[1] = len as u8;
        eeprom.write(0, &buf[..HEADER_LEN + len])?;
        eeprom.commit()?;
        Ok(())
    }
}
