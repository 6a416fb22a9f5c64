//! GNSS and UAT serial ports
//!
//! Both ports are interrupt-driven [`BufferedUart`]s built by the firmware.
//! The GNSS port optionally owns the receiver's reset line and the enable
//! of the 1.8V/3.3V level shifters; the UAT port optionally owns the
//! module enable line.
//!
//! Ending the GNSS port drops its driver, which disables the USART and
//! returns its pins to analog. It cannot be reopened within the same boot.

use aerotrack_hal::{SerialOps, UatOps};
use embassy_stm32::gpio::{Flex, Pull, Speed};
use embassy_stm32::pac::usart::Usart;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_time::{block_for, Duration};

const GNSS_RESET_HOLD: Duration = Duration::from_millis(200);
const GNSS_RESET_SETTLE: Duration = Duration::from_millis(100);
const SHIFTER_OFF_SETTLE: Duration = Duration::from_millis(100);
const UAT_PULSE: Duration = Duration::from_millis(100);

fn drive(pin: &mut Flex<'static>, high: bool) {
    if high {
        pin.set_high();
    } else {
        pin.set_low();
    }
    pin.set_as_output(Speed::Low);
}

fn float(pin: &mut Flex<'static>) {
    pin.set_as_input(Pull::None);
}

fn apply_baud(uart: &mut BufferedUart<'static>, baud: u32) {
    let mut config = usart::Config::default();
    config.baudrate = baud;
    if uart.set_config(&config).is_err() {
        warn!("unsupported baud rate {}", baud);
    }
}

/// GNSS receiver bring-up lines
pub struct GnssControl {
    pub reset: Flex<'static>,
    pub level_shifter: Flex<'static>,
}

/// Secondary serial port wired to the GNSS receiver
pub struct Stm32Serial {
    uart: Option<BufferedUart<'static>>,
    regs: Usart,
    control: Option<GnssControl>,
    open: bool,
}

impl Stm32Serial {
    /// `regs` is the register block behind `uart`
    pub fn new(uart: BufferedUart<'static>, regs: Usart, control: Option<GnssControl>) -> Self {
        Self {
            uart: Some(uart),
            regs,
            control,
            open: false,
        }
    }

    /// The underlying port, for the NMEA reader; `None` once ended
    pub fn port(&mut self) -> Option<&mut BufferedUart<'static>> {
        self.uart.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl SerialOps for Stm32Serial {
    fn begin(&mut self, baud: u32) {
        let Some(uart) = self.uart.as_mut() else {
            warn!("gnss port already released");
            return;
        };
        if self.open {
            apply_baud(uart, baud);
            return;
        }

        if let Some(control) = self.control.as_mut() {
            drive(&mut control.reset, false);
            drive(&mut control.level_shifter, true);
            block_for(GNSS_RESET_HOLD);
            drive(&mut control.reset, true);
            block_for(GNSS_RESET_SETTLE);
            float(&mut control.reset);
        }
        apply_baud(uart, baud);
        self.open = true;
    }

    fn enable_rx(&mut self, enabled: bool) {
        if self.open {
            self.regs.cr1().modify(|w| w.set_re(enabled));
        }
    }

    fn end(&mut self) {
        if let Some(control) = self.control.as_mut() {
            drive(&mut control.level_shifter, false);
            block_for(SHIFTER_OFF_SETTLE);
            float(&mut control.level_shifter);
        }
        if self.uart.take().is_some() {
            debug!("gnss port released");
        }
        self.open = false;
    }
}

/// Serial port wired to the UAT receiver module
pub struct Stm32Uat {
    uart: BufferedUart<'static>,
    enable: Option<Flex<'static>>,
}

impl Stm32Uat {
    pub fn new(uart: BufferedUart<'static>, enable: Option<Flex<'static>>) -> Self {
        Self { uart, enable }
    }

    pub fn port(&mut self) -> &mut BufferedUart<'static> {
        &mut self.uart
    }
}

impl UatOps for Stm32Uat {
    fn begin(&mut self, baud: u32) {
        apply_baud(&mut self.uart, baud);
    }

    fn restart_module(&mut self) {
        let Some(enable) = self.enable.as_mut() else {
            return;
        };
        drive(enable, false);
        block_for(UAT_PULSE);
        drive(enable, true);
        block_for(UAT_PULSE);
        float(enable);
    }
}
