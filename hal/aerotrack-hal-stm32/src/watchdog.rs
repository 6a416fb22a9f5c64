//! Independent watchdog
//!
//! The IWDG cannot be stopped once started. Finalizing it reprograms the
//! longest available period instead, which leaves the shutdown path time
//! to complete.

use aerotrack_hal::WatchdogOps;
use embassy_stm32::pac::iwdg::regs::{Kr, Pr, Rlr};
use embassy_stm32::pac::IWDG;
use embassy_stm32::peripherals;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Peri;

const KEY_UNLOCK: u32 = 0x5555;
const KEY_RELOAD: u32 = 0xAAAA;
/// Divide by 256
const PRESCALER_MAX: u32 = 0x6;
const RELOAD_MAX: u32 = 0xFFF;

pub struct Stm32Watchdog {
    idle: Option<Peri<'static, peripherals::IWDG>>,
    running: Option<IndependentWatchdog<'static, peripherals::IWDG>>,
}

impl Stm32Watchdog {
    pub fn new(iwdg: Peri<'static, peripherals::IWDG>) -> Self {
        Self {
            idle: Some(iwdg),
            running: None,
        }
    }
}

impl WatchdogOps for Stm32Watchdog {
    fn setup(&mut self, timeout_us: u32) {
        let Some(iwdg) = self.idle.take() else {
            warn!("watchdog already running");
            return;
        };
        let mut dog = IndependentWatchdog::new(iwdg, timeout_us);
        dog.unleash();
        self.running = Some(dog);
    }

    fn reload(&mut self) {
        if let Some(dog) = self.running.as_mut() {
            dog.pet();
        }
    }

    fn is_enabled(&self) -> bool {
        self.running.is_some()
    }

    fn finalize(&mut self) {
        if self.running.is_none() {
            return;
        }
        IWDG.kr().write_value(Kr(KEY_UNLOCK));
        while IWDG.sr().read().pvu() {}
        IWDG.pr().write_value(Pr(PRESCALER_MAX));
        while IWDG.sr().read().rvu() {}
        IWDG.rlr().write_value(Rlr(RELOAD_MAX));
        IWDG.kr().write_value(Kr(KEY_RELOAD));
        debug!("watchdog stretched to maximum period");
    }
}
