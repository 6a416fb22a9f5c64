mod common;

use aerotrack_core::PowerState;
use aerotrack_hal::{BootAction, BootIndex, ResetReason};
use aerotrack_hal_host::{Peripheral, SimBoard, SimEvent};

use common::{blue_pill, boot_halted, boot_running, tmotion};

const ACTION: usize = BootIndex::Action as usize;
const COUNTER: usize = BootIndex::Counter as usize;

#[test]
fn test_first_boot_is_normal() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());

    let report = runtime.boot_report();
    assert_eq!(report.action, BootAction::Normal);
    assert_eq!(report.boot_count, 1);
    assert!(!report.woke_from_sleep);
    assert_eq!(runtime.state(), PowerState::Running);
    assert!(board.watchdog_timeout().is_some());
}

#[test]
fn test_boot_counter_counts_every_boot() {
    let board = SimBoard::default();

    // 1: normal, then plain restart
    let runtime = boot_running(&board, tmotion());
    runtime.restart();
    assert!(board.reboot());

    // 2: normal, shutdown into serial deep sleep
    let runtime = boot_running(&board, tmotion());
    runtime.shutdown("SLEEP");
    assert!(board.reboot());

    // 3: deep sleep path, then shutdown into full halt
    board.queue_serial_rx(b"$PSRF");
    let runtime = boot_running(&board, blue_pill());
    assert!(runtime.boot_report().woke_from_sleep);
    runtime.shutdown("OFF");
    assert!(board.reboot());

    // 4: halted
    let report = boot_halted(&board, blue_pill());
    assert_eq!(report.boot_count, 4);

    // 5: external reset out of the halt
    board.press_reset();
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().boot_count, 5);
    assert_eq!(board.retained(COUNTER), 5);
}

#[test]
fn test_shutdown_request_halts_next_boot() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, blue_pill());
    runtime.shutdown("OFF");
    assert_eq!(board.retained(ACTION), BootAction::Shutdown.as_u32());

    assert!(board.reboot());
    board.take_events();

    let report = boot_halted(&board, blue_pill());
    assert_eq!(report.action, BootAction::Shutdown);
    assert_eq!(report.reset.reason, ResetReason::SoftwareRestart);
    assert!(board.is_halted());

    let events = board.take_events();
    assert!(events.contains(&SimEvent::PowerOff));
    assert!(!events.contains(&SimEvent::DriversBuilt));
    assert!(!events.contains(&SimEvent::PlatformSetup));
    assert!(!events.iter().any(|e| matches!(
        e,
        SimEvent::Setup(_) | SimEvent::SpiBegin | SimEvent::SerialBegin { .. }
    )));
    assert!(board.watchdog_timeout().is_none());
}

#[test]
fn test_external_reset_recovers_from_halt() {
    let board = SimBoard::default();
    boot_running(&board, blue_pill()).shutdown("OFF");
    assert!(board.reboot());
    boot_halted(&board, blue_pill());

    // Nothing pending while halted; only the reset pin gets out
    assert!(!board.reboot());
    board.press_reset();

    let runtime = boot_running(&board, blue_pill());
    assert_eq!(runtime.boot_report().action, BootAction::Normal);
    assert_eq!(runtime.boot_report().reset.reason, ResetReason::ExternalPin);
}

#[test]
fn test_serial_deep_sleep_is_one_shot() {
    let board = SimBoard::default();
    boot_running(&board, tmotion()).shutdown("SLEEP");
    assert_eq!(board.retained(ACTION), BootAction::SerialDeepSleep.as_u32());
    assert!(board.reboot());
    board.take_events();

    board.queue_serial_rx(b"wake");
    let runtime = boot_running(&board, tmotion());
    let report = *runtime.boot_report();
    assert_eq!(report.action, BootAction::SerialDeepSleep);
    assert!(report.woke_from_sleep);
    assert_eq!(board.retained(ACTION), BootAction::Normal.as_u32());

    let events = board.take_events();
    let position = |wanted: &SimEvent| events.iter().position(|e| e == wanted);

    let armed = position(&SimEvent::ArmSerialWake).expect("wake source armed");
    let rewritten = position(&SimEvent::RetainedWrite {
        index: ACTION,
        value: BootAction::Normal.as_u32(),
    })
    .expect("action rewritten");
    // Action already reads Normal while the device is suspended
    let slept = position(&SimEvent::DeepSleep { action: 0 }).expect("slept");
    let drained = position(&SimEvent::DrainWake { bytes: 4 }).expect("drained");
    let built = position(&SimEvent::DriversBuilt).expect("drivers built");
    let setup = position(&SimEvent::PlatformSetup).expect("setup");

    assert!(armed < rewritten);
    assert!(rewritten < slept);
    assert!(slept < drained);
    assert!(drained < built);
    assert!(built < setup);
    assert!(!events[..drained]
        .iter()
        .any(|e| matches!(e, SimEvent::Setup(_))));

    // The following boot is ordinary
    drop(runtime);
    board.press_reset();
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().action, BootAction::Normal);
    assert!(!runtime.boot_report().woke_from_sleep);
}

#[test]
fn test_interrupted_sleep_boots_normally() {
    let board = SimBoard::default();
    boot_running(&board, tmotion()).shutdown("SLEEP");
    assert!(board.reboot());

    let runtime = boot_running(&board, tmotion());
    assert!(runtime.boot_report().woke_from_sleep);

    // Reset during the wait: the action was consumed before suspending
    drop(runtime);
    board.press_reset();
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().action, BootAction::Normal);
}

#[test]
fn test_boot_counter_survives_reset_not_power_loss() {
    let board = SimBoard::default();
    boot_running(&board, tmotion()).restart();
    assert!(board.reboot());
    assert_eq!(boot_running(&board, tmotion()).boot_report().boot_count, 2);

    board.power_cycle();
    let runtime = boot_running(&board, tmotion());
    assert_eq!(runtime.boot_report().boot_count, 1);
    assert_eq!(runtime.boot_report().reset.reason, ResetReason::Default);
}

#[test]
fn test_shutdown_sequence_order() {
    let board = SimBoard::new(aerotrack_hal_host::SimConfig {
        usb: true,
        ..Default::default()
    });
    let runtime = boot_running(&board, tmotion());
    board.take_events();

    let platform = runtime.shutdown("LOW BAT");
    assert_eq!(platform.farewell_message(), Some("LOW BAT"));

    let events = board.take_events();
    assert_eq!(
        events,
        vec![
            SimEvent::WatchdogStretched,
            SimEvent::Finalize(Peripheral::Display),
            SimEvent::Finalize(Peripheral::Button),
            SimEvent::Finalize(Peripheral::Usb),
            SimEvent::Finalize(Peripheral::Battery),
            SimEvent::SerialEnd,
            SimEvent::SpiEnd,
            SimEvent::PlatformFinalize,
            SimEvent::RetainedWrite {
                index: ACTION,
                value: BootAction::SerialDeepSleep.as_u32(),
            },
            SimEvent::Reset,
        ]
    );
}

#[test]
fn test_reset_diagnostics_precede_peripheral_setup() {
    let board = SimBoard::default();
    let _runtime = boot_running(&board, tmotion());
    let events = board.take_events();

    assert_eq!(events.first(), Some(&SimEvent::ResetFlagsCleared));
    let counted = events
        .iter()
        .position(|e| matches!(e, SimEvent::RetainedWrite { index: COUNTER, .. }))
        .expect("counter bumped");
    let built = events
        .iter()
        .position(|e| *e == SimEvent::DriversBuilt)
        .expect("drivers built");
    let first_setup = events
        .iter()
        .position(|e| matches!(e, SimEvent::Setup(_)))
        .expect("peripherals set up");
    let platform_setup = events
        .iter()
        .position(|e| *e == SimEvent::PlatformSetup)
        .expect("platform set up");
    let armed = events
        .iter()
        .position(|e| matches!(e, SimEvent::WatchdogArmed { .. }))
        .expect("watchdog armed");
    assert!(counted < built);
    assert!(built < platform_setup);
    assert!(platform_setup < first_setup);
    assert!(first_setup < armed);
}

#[test]
fn test_drivers_built_once_per_running_boot() {
    let board = SimBoard::default();
    boot_running(&board, blue_pill()).shutdown("OFF");
    let built = |events: &[SimEvent]| {
        events
            .iter()
            .filter(|e| **e == SimEvent::DriversBuilt)
            .count()
    };
    assert_eq!(built(&board.take_events()), 1);

    assert!(board.reboot());
    boot_halted(&board, blue_pill());
    assert_eq!(built(&board.take_events()), 0);
}

#[test]
fn test_shutdown_releases_serial_and_spi() {
    let board = SimBoard::default();
    let runtime = boot_running(&board, tmotion());
    assert!(board.serial_open());
    assert!(board.spi_open());

    runtime.shutdown("BYE");
    assert!(!board.serial_open());
    assert!(!board.spi_open());
}
