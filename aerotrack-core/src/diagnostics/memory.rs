//! Free-memory estimation
//!
//! Stack and heap share one RAM region and grow toward each other. Free
//! memory is the unclaimed gap between them plus whatever the allocator
//! holds free inside blocks it already owns.

/// Raw inputs to the estimator, as addresses and byte counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemorySnapshot {
    /// Current stack pointer
    pub stack_pointer: u32,
    /// Lowest address the stack is budgeted to reach
    pub stack_floor: u32,
    /// First address past the heap's claimed region
    pub heap_end: u32,
    /// Free bytes inside blocks the allocator already owns
    pub allocator_free: u32,
    /// Physical RAM size in bytes
    pub total_ram: u32,
}

/// Estimate free memory in bytes
///
/// The gap is measured from the lower of the stack pointer and the stack
/// floor down to the heap end, and never goes negative. The result is
/// capped at the physical RAM size.
pub fn estimate_free(snapshot: &MemorySnapshot) -> u32 {
    let stack_limit = snapshot.stack_pointer.min(snapshot.stack_floor);
    let gap = stack_limit.saturating_sub(snapshot.heap_end);

    gap.saturating_add(snapshot.allocator_free)
        .min(snapshot.total_ram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RAM_BASE: u32 = 0x2000_0000;
    const RAM_SIZE: u32 = 20 * 1024;

    fn snapshot(sp: u32, heap_end: u32, allocator_free: u32) -> MemorySnapshot {
        MemorySnapshot {
            stack_pointer: sp,
            stack_floor: RAM_BASE + RAM_SIZE - 0x400,
            heap_end,
            allocator_free,
            total_ram: RAM_SIZE,
        }
    }

    #[test]
    fn test_gap_plus_fragments() {
        let snap = snapshot(RAM_BASE + 0x4F00, RAM_BASE + 0x3000, 256);
        // floor (0x4C00) is below sp, so the floor bounds the gap
        assert_eq!(estimate_free(&snap), 0x4C00 - 0x3000 + 256);
    }

    #[test]
    fn test_stack_below_floor_uses_stack_pointer() {
        let snap = snapshot(RAM_BASE + 0x3800, RAM_BASE + 0x3000, 0);
        assert_eq!(estimate_free(&snap), 0x800);
    }

    #[test]
    fn test_collision_clamps_to_fragments() {
        let snap = snapshot(RAM_BASE + 0x2000, RAM_BASE + 0x3000, 64);
        assert_eq!(estimate_free(&snap), 64);
    }

    proptest! {
        #[test]
        fn never_exceeds_ram(
            sp in RAM_BASE..RAM_BASE + RAM_SIZE,
            heap_end in RAM_BASE..RAM_BASE + RAM_SIZE,
            free in 0u32..=u32::MAX,
        ) {
            prop_assert!(estimate_free(&snapshot(sp, heap_end, free)) <= RAM_SIZE);
        }

        #[test]
        fn live_allocations_reduce_estimate(
            heap_end in RAM_BASE + 0x1000..RAM_BASE + 0x2000,
            free in 0u32..0x400,
            grow in 1u32..0x800,
        ) {
            let sp = RAM_BASE + 0x4800;
            let before = estimate_free(&snapshot(sp, heap_end, free));
            let after = estimate_free(&snapshot(sp, heap_end + grow, free));
            prop_assert!(after < before);
        }

        #[test]
        fn consuming_fragments_reduces_estimate(
            free in 1u32..0x400,
            used in 1u32..0x400,
        ) {
            let used = used.min(free);
            let sp = RAM_BASE + 0x4800;
            let heap_end = RAM_BASE + 0x2000;
            let before = estimate_free(&snapshot(sp, heap_end, free));
            let after = estimate_free(&snapshot(sp, heap_end, free - used));
            prop_assert!(after < before);
        }
    }
}
