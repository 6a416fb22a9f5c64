#![allow(dead_code)]

use aerotrack_core::config::{BoardConfig, BoardVariant};
use aerotrack_core::{BootReport, Runtime, Startup};
use aerotrack_hal_host::{HostBoot, HostPlatform, SimBoard};

pub fn tmotion() -> &'static BoardConfig {
    BoardVariant::TMotion11.config()
}

pub fn blue_pill() -> &'static BoardConfig {
    BoardVariant::BluePill.config()
}

pub fn boot(board: &SimBoard, config: &'static BoardConfig) -> Startup<HostPlatform> {
    Runtime::boot(HostBoot::new(board), config, HostPlatform::assemble)
}

pub fn boot_running(board: &SimBoard, config: &'static BoardConfig) -> Runtime<HostPlatform> {
    match boot(board, config) {
        Startup::Running(runtime) => runtime,
        Startup::Halted { report, .. } => panic!("expected a running boot, got halted: {report:?}"),
    }
}

pub fn boot_halted(board: &SimBoard, config: &'static BoardConfig) -> BootReport {
    match boot(board, config) {
        Startup::Running(runtime) => panic!("expected halt, got {:?}", runtime.boot_report()),
        Startup::Halted { report, .. } => report,
    }
}
