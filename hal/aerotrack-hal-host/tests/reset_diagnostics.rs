mod common;

use aerotrack_core::diagnostics::decode;
use aerotrack_hal::{Platform, ResetFlags, ResetReason};
use aerotrack_hal_host::{SimBoard, SimConfig, WatchdogKind};
use proptest::prelude::*;

use common::{boot_running, tmotion};

#[test]
fn test_power_on_reports_default() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());

    let reset = runtime.boot_report().reset;
    assert_eq!(reset.reason, ResetReason::Default);
    assert!(reset.flags.contains(ResetFlags::POWER_ON));
    assert_eq!(runtime.platform().reset_reason(), ResetReason::Default);
    assert_eq!(
        runtime.platform().reset_details(),
        "No reset information available"
    );
}

#[test]
fn test_flags_cleared_after_decode() {
    let board = SimBoard::default();
    assert!(!board.reset_flags().is_empty());

    let _runtime = boot_running(&board, tmotion());
    assert!(board.reset_flags().is_empty());
}

#[test]
fn test_software_restart_reason() {
    let board = SimBoard::default();
    boot_running(&board, tmotion()).restart();
    assert!(board.reboot());

    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.platform().reset_reason(), ResetReason::SoftwareRestart);
    assert_eq!(runtime.platform().reset_reason().as_str(), "SOFT_RESTART");
}

#[test]
fn test_stale_flags_do_not_leak_into_next_boot() {
    let board = SimBoard::default();
    boot_running(&board, tmotion()).restart();
    assert!(board.reboot());
    boot_running(&board, tmotion()).restart();
    assert!(board.reboot());

    // Only SOFTWARE is latched; the power-on flags were cleared on boot 1
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().reset.flags, ResetFlags::SOFTWARE);
}

#[test]
fn test_unserviced_watchdog_reports_timeout() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());
    let timeout_ms = runtime.watchdog().timeout_us() / 1000;

    // Superloop hangs
    assert!(!board.advance(timeout_ms / 2));
    assert!(board.advance(timeout_ms));
    drop(runtime);
    assert!(board.reboot());

    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().reset.reason, ResetReason::WatchdogTimeout);
    assert!(runtime.platform().reset_reason().is_watchdog());
}

#[test]
fn test_independent_watchdog_reports_software_watchdog() {
    let board = SimBoard::new(SimConfig {
        watchdog: WatchdogKind::Independent,
        ..Default::default()
    });
    let runtime = boot_running(&board, tmotion());
    assert!(board.advance(6000));
    drop(runtime);
    assert!(board.reboot());

    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().reset.reason, ResetReason::SoftwareWatchdog);
}

#[test]
fn test_serviced_watchdog_never_bites() {
    let board = SimBoard::default();
    let mut runtime = boot_running(&board, tmotion());

    for _ in 0..30 {
        runtime.tick();
        assert!(!board.advance(1000));
    }
    assert!(board.watchdog_reloads() >= 30);
}

#[test]
fn test_suspended_watchdog_before_reset_does_not_bite() {
    let board = SimBoard::default();
    let platform = boot_running(&board, tmotion()).shutdown("SLEEP");
    assert!(!board.advance(60_000));
    drop(platform);

    assert!(board.reboot());
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().reset.reason, ResetReason::SoftwareRestart);
}

proptest! {
    #[test]
    fn boot_reports_decoded_reason(bits in 0u8..64) {
        let board = SimBoard::default();
        let flags = ResetFlags::from_bits_truncate(bits);
        board.set_reset_flags(flags);

        let runtime = boot_running(&board, tmotion());
        prop_assert_eq!(runtime.boot_report().reset.reason, decode(flags));
        prop_assert_eq!(runtime.boot_report().reset.flags, flags);
        prop_assert!(board.reset_flags().is_empty());
    }
}
