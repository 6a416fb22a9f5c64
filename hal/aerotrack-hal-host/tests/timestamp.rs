mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use aerotrack_hal::{GnssOps, Platform};
use aerotrack_hal_host::SimBoard;

use common::{boot_running, tmotion};

#[test]
fn test_pps_edge_marks_current_tick() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());

    board.advance(1234);
    runtime.platform().gnss().on_pps_edge();
    assert_eq!(runtime.pps_marker(), 1234);

    board.advance(1000);
    runtime.platform().gnss().on_pps_edge();
    assert_eq!(runtime.pps_marker(), 2234);
}

#[test]
fn test_concurrent_producer_last_value_wins() {
    let board = SimBoard::default();
    let mut runtime = boot_running(&board, tmotion());
    let marker = board.pps();
    let done = Arc::new(AtomicBool::new(false));

    // Values carry the same pattern in both halves; a torn read would mix them
    let producer = {
        let marker = Arc::clone(&marker);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..=50_000u32 {
                let half = i & 0xFFFF;
                marker.mark(half << 16 | half);
            }
            done.store(true, Ordering::Release);
        })
    };

    while !done.load(Ordering::Acquire) {
        runtime.tick();
        let value = runtime.pps_marker();
        assert_eq!(value >> 16, value & 0xFFFF, "torn read: {value:#x}");
    }
    producer.join().unwrap();

    let last_half = 50_000u32 & 0xFFFF;
    assert_eq!(runtime.pps_marker(), last_half << 16 | last_half);
}
