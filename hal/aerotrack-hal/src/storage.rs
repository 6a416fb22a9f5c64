//! Settings EEPROM abstractions
//!
//! The EEPROM holds user settings. Its layout belongs to the settings codec;
//! this module only sizes, reads and writes raw bytes.

/// Errors from EEPROM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Requested size exceeds the physical capacity
    CapacityExceeded {
        /// Bytes requested
        requested: usize,
        /// Bytes available
        capacity: usize,
    },
    /// Access outside the opened region
    OutOfBounds,
    /// Operation attempted before a successful `begin`
    NotInitialized,
    /// Write or commit failed at the hardware level
    WriteFailed,
}

/// Byte-addressable settings EEPROM
pub trait EepromOps {
    /// Physical capacity in bytes
    fn capacity(&self) -> usize;

    /// Open a region of `size` bytes
    ///
    /// Fails with [`EepromError::CapacityExceeded`] if `size` exceeds the
    /// capacity; nothing is read or written in that case.
    fn begin(&mut self, size: usize) -> Result<(), EepromError>;

    /// Read bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError>;

    /// Stage bytes starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError>;

    /// Persist staged writes
    fn commit(&mut self) -> Result<(), EepromError> {
        Ok(())
    }
}

/// Check that `size` fits in `capacity`
pub fn check_capacity(size: usize, capacity: usize) -> Result<(), EepromError> {
    if size > capacity {
        return Err(EepromError::CapacityExceeded {
            requested: size,
            capacity,
        });
    }
    Ok(())
}

/// Check that `len` bytes at `offset` fit in an opened region of `size`
pub fn check_bounds(offset: usize, len: usize, size: usize) -> Result<(), EepromError> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(EepromError::OutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_check() {
        assert!(check_capacity(1024, 6144).is_ok());
        assert!(check_capacity(6144, 6144).is_ok());
        assert_eq!(
            check_capacity(6145, 6144),
            Err(EepromError::CapacityExceeded {
                requested: 6145,
                capacity: 6144
            })
        );
    }

    #[test]
    fn test_bounds_check() {
        assert!(check_bounds(0, 16, 16).is_ok());
        assert_eq!(check_bounds(8, 9, 16), Err(EepromError::OutOfBounds));
        assert_eq!(check_bounds(usize::MAX, 2, 16), Err(EepromError::OutOfBounds));
    }
}
