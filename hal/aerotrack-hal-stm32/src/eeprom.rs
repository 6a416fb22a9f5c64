//! Data EEPROM
//!
//! `begin` copies the requested region into a RAM shadow. Writes land in
//! the shadow and reach the EEPROM on `commit`, byte by byte, skipping
//! bytes that did not change.

use aerotrack_hal::storage::{check_bounds, check_capacity};
use aerotrack_hal::{EepromError, EepromOps};
use embassy_stm32::flash::Flash;
use embassy_stm32::mode::Blocking;
use heapless::Vec;

/// Data EEPROM size on the category 5 L0 parts
pub const DATA_EEPROM_SIZE: usize = 6 * 1024;

/// Largest region `begin` will shadow
pub const SHADOW_SIZE: usize = 256;

pub struct Stm32Eeprom {
    flash: Flash<'static, Blocking>,
    shadow: Vec<u8, SHADOW_SIZE>,
    opened: bool,
    dirty: bool,
}

impl Stm32Eeprom {
    pub fn new(flash: Flash<'static, Blocking>) -> Self {
        Self {
            flash,
            shadow: Vec::new(),
            opened: false,
            dirty: false,
        }
    }

    fn region(&self) -> Result<usize, EepromError> {
        if self.opened {
            Ok(self.shadow.len())
        } else {
            Err(EepromError::NotInitialized)
        }
    }
}

impl EepromOps for Stm32Eeprom {
    fn capacity(&self) -> usize {
        DATA_EEPROM_SIZE.min(SHADOW_SIZE)
    }

    fn begin(&mut self, size: usize) -> Result<(), EepromError> {
        // A failed begin leaves the region closed
        self.opened = false;
        check_capacity(size, self.capacity())?;

        self.shadow.clear();
        self.shadow
            .resize(size, 0)
            .map_err(|_| EepromError::CapacityExceeded {
                requested: size,
                capacity: SHADOW_SIZE,
            })?;
        self.flash
            .eeprom_read_slice(0, &mut self.shadow)
            .map_err(|_| EepromError::WriteFailed)?;

        self.opened = true;
        self.dirty = false;
        Ok(())
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(offset, buf.len(), self.region()?)?;
        buf.copy_from_slice(&self.shadow[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(offset, data.len(), self.region()?)?;
        let target = &mut self.shadow[offset..offset + data.len()];
        if target != data {
            target.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        self.region()?;
        if !self.dirty {
            return Ok(());
        }

        let mut stored = [0u8; 1];
        for (offset, &byte) in self.shadow.iter().enumerate() {
            let offset = offset as u32;
            self.flash
                .eeprom_read_slice(offset, &mut stored)
                .map_err(|_| EepromError::WriteFailed)?;
            if stored[0] != byte {
                self.flash
                    .eeprom_write_slice(offset, &[byte])
                    .map_err(|_| EepromError::WriteFailed)?;
            }
        }
        self.dirty = false;
        debug!("eeprom committed {} bytes", self.shadow.len());
        Ok(())
    }
}
