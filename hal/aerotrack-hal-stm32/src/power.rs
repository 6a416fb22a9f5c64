//! Low-power modes
//!
//! Serial deep sleep is STOP mode woken by the falling edge of a start bit
//! on the GNSS receive pin. Power-off is STANDBY; only a reset leaves it.

use aerotrack_core::config::PinId;
use aerotrack_hal::PowerOps;
use cortex_m::peripheral::SCB;
use embassy_stm32::pac::usart::Usart;
use embassy_stm32::pac::{EXTI, PWR, SYSCFG};

/// `PWR_CR.PDDS`: STANDBY instead of STOP on deep sleep
const CR_PDDS: u32 = 1 << 1;

pub struct Stm32Power {
    scb: SCB,
    wake_pin: PinId,
    wake_usart: Usart,
}

impl Stm32Power {
    /// `wake_pin` is the receive pin of `wake_usart`
    pub fn new(scb: SCB, wake_pin: PinId, wake_usart: Usart) -> Self {
        Self {
            scb,
            wake_pin,
            wake_usart,
        }
    }

    fn wake_line(&self) -> usize {
        usize::from(self.wake_pin.index)
    }

    fn enter_deep_sleep(&mut self) {
        PWR.cr().modify(|w| {
            w.set_cwuf(true);
            w.set_lpsdsr(true);
        });
        self.scb.set_sleepdeep();
        cortex_m::asm::dsb();
        cortex_m::asm::wfi();
        self.scb.clear_sleepdeep();
    }
}

impl PowerOps for Stm32Power {
    fn arm_serial_wake(&mut self) {
        let line = self.wake_line();
        let port = self.wake_pin.port as u8;
        SYSCFG
            .exticr(line / 4)
            .modify(|w| w.set_exti(line % 4, port));
        EXTI.ftsr(0).modify(|w| w.set_line(line, true));
        EXTI.pr(0).write(|w| w.set_line(line, true));
        EXTI.imr(0).modify(|w| w.set_line(line, true));
        debug!("serial wake armed on line {}", line);
    }

    fn deep_sleep(&mut self) {
        PWR.cr().modify(|w| w.0 &= !CR_PDDS);
        self.enter_deep_sleep();
    }

    fn drain_wake_transport(&mut self) {
        let line = self.wake_line();
        EXTI.imr(0).modify(|w| w.set_line(line, false));
        EXTI.ftsr(0).modify(|w| w.set_line(line, false));
        EXTI.pr(0).write(|w| w.set_line(line, true));

        let mut dropped = 0u32;
        while self.wake_usart.isr().read().rxne() {
            let _ = self.wake_usart.rdr().read();
            dropped += 1;
        }
        debug!("woke from serial deep sleep, dropped {} bytes", dropped);
    }

    fn power_off(&mut self) {
        PWR.cr().modify(|w| w.0 |= CR_PDDS);
        loop {
            self.enter_deep_sleep();
        }
    }
}
