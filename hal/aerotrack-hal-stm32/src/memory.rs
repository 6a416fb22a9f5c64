//! RAM layout and free-memory snapshot

use aerotrack_core::diagnostics::MemorySnapshot;
use embedded_alloc::LlffHeap;

pub const RAM_BASE: u32 = 0x2000_0000;
pub const RAM_SIZE: u32 = 20 * 1024;
/// Stack budget kept clear below the top of RAM
pub const MIN_STACK: u32 = 0x400;

/// The firmware's global heap and the region it was initialized with
pub struct HeapRegion {
    pub heap: &'static LlffHeap,
    pub start: u32,
    pub size: u32,
}

impl HeapRegion {
    /// Capture stack pointer and allocator state
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            stack_pointer: cortex_m::register::msp::read(),
            stack_floor: RAM_BASE + RAM_SIZE - MIN_STACK,
            heap_end: self.start + self.size,
            allocator_free: self.heap.free() as u32,
            total_ram: RAM_SIZE,
        }
    }
}
