//! Device identity derivation
//!
//! The tracker's over-the-air address is derived from the MCU's 96-bit
//! unique id. Derived addresses landing in a congested block used by other
//! traffic-awareness devices are shifted out of it.

use core::ops::RangeInclusive;

/// 24-bit address block that derived ids must avoid
pub const RESERVED_RANGE: RangeInclusive<u32> = 0x00DD_0000..=0x00DF_FFFF;

/// Offset applied to ids inside [`RESERVED_RANGE`]
pub const REMAP_OFFSET: u32 = 0x0010_0000;

/// Fold a 96-bit unique id into a 32-bit chip id
pub fn derive_chip_id(uid: [u32; 3]) -> u32 {
    remap(uid[0] ^ uid[1] ^ uid[2])
}

/// Shift an id out of the reserved address block
pub fn remap(id: u32) -> u32 {
    if RESERVED_RANGE.contains(&(id & 0x00FF_FFFF)) {
        id.wrapping_add(REMAP_OFFSET)
    } else {
        id
    }
}

/// Resolve the chip id, honoring a fixed board address when one is set
pub fn chip_id(uid: [u32; 3], fixed_address: Option<u32>) -> u32 {
    match fixed_address {
        Some(address) => address,
        None => derive_chip_id(uid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_fold() {
        assert_eq!(derive_chip_id([0x1234_0000, 0x0000_5678, 0]), 0x1234_5678);
    }

    #[test]
    fn test_reserved_range_is_remapped() {
        assert_eq!(remap(0x00DD_0000), 0x00ED_0000);
        assert_eq!(remap(0xAADF_FFFF), 0xAAEF_FFFF);
        assert_eq!(remap(0x00DC_FFFF), 0x00DC_FFFF);
        assert_eq!(remap(0x00E0_0000), 0x00E0_0000);
    }

    #[test]
    fn test_fixed_address_wins() {
        assert_eq!(chip_id([1, 2, 3], Some(0x00DD_1234)), 0x00DD_1234);
        assert_eq!(chip_id([1, 2, 4], None), 7);
    }
}
