mod common;

use aerotrack_hal_host::SimBoard;
use proptest::prelude::*;

use common::{boot_running, tmotion};

#[test]
fn test_free_heap_bounded_by_ram() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());
    let ram = board.config().ram.size;
    assert!(runtime.free_heap() > 0);
    assert!(runtime.free_heap() <= ram);
}

#[test]
fn test_stack_below_floor() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());
    let memory = board.memory();

    // Deep recursion: stack pointer drops under the budgeted floor
    board.set_stack_pointer(memory.stack_floor - 0x200);
    let expected = memory.stack_floor - 0x200 - memory.heap_end;
    assert_eq!(runtime.free_heap(), expected);

    // Stack ran into the heap: only fragments are left
    board.free_fragment(48);
    board.set_stack_pointer(memory.heap_end - 0x10);
    assert_eq!(runtime.free_heap(), 48);
}

proptest! {
    #[test]
    fn leaking_allocations_shrink_free_heap(sizes in prop::collection::vec(1u32..256, 1..16)) {
        let board = SimBoard::default();
        let runtime = boot_running(&board, tmotion());

        let mut last = runtime.free_heap();
        for size in sizes {
            board.grow_heap(size);
            let now = runtime.free_heap();
            prop_assert!(now < last);
            last = now;
        }
    }
}
