//! Simulated peripherals
//!
//! Each peripheral is a thin handle onto the shared [`BoardState`]; every
//! hardware-visible operation is recorded as a [`SimEvent`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use aerotrack_hal::spi::SpiConfig;
use aerotrack_hal::storage::{check_bounds, check_capacity};
use aerotrack_hal::{
    BaroOps, BatteryOps, BootIndex, BootStore, ButtonOps, DisplayKind, DisplayOps, EepromError,
    EepromOps, GnssOps, IoDevice, Lifecycle, NetworkOps, PowerOps, ResetCauseRegister,
    ResetFlags, SerialOps, SoundOps, SpiOps, TimeMarker, UatOps, WatchdogOps, SELF_TEST_MELODY,
};

use crate::board::{BoardState, Peripheral, SimEvent};

pub(crate) type Shared = Rc<RefCell<BoardState>>;

/// Reset-cause flag register
#[derive(Debug)]
pub struct SimResetRegister(pub(crate) Shared);

impl ResetCauseRegister for SimResetRegister {
    fn read(&mut self) -> ResetFlags {
        self.0.borrow().reset_flags
    }

    fn clear(&mut self) {
        let mut state = self.0.borrow_mut();
        state.reset_flags = ResetFlags::empty();
        state.record(SimEvent::ResetFlagsCleared);
    }
}

/// Retained backup registers
#[derive(Debug)]
pub struct SimRetained(pub(crate) Shared);

impl BootStore for SimRetained {
    fn read(&mut self, index: BootIndex) -> u32 {
        self.0.borrow().retained[index.as_usize()]
    }

    fn write(&mut self, index: BootIndex, value: u32) {
        let mut state = self.0.borrow_mut();
        state.retained[index.as_usize()] = value;
        state.record(SimEvent::RetainedWrite {
            index: index.as_usize(),
            value,
        });
    }
}

/// Low-power controller
#[derive(Debug)]
pub struct SimPower(pub(crate) Shared);

impl PowerOps for SimPower {
    fn arm_serial_wake(&mut self) {
        self.0.borrow_mut().record(SimEvent::ArmSerialWake);
    }

    fn deep_sleep(&mut self) {
        let mut state = self.0.borrow_mut();
        let action = state.retained[BootIndex::Action.as_usize()];
        state.record(SimEvent::DeepSleep { action });
    }

    fn drain_wake_transport(&mut self) {
        let mut state = self.0.borrow_mut();
        let bytes = state.serial_rx.len();
        state.serial_rx.clear();
        state.record(SimEvent::DrainWake { bytes });
    }

    fn power_off(&mut self) {
        let mut state = self.0.borrow_mut();
        state.halted = true;
        state.record(SimEvent::PowerOff);
    }
}

/// Independent or window watchdog, depending on the board config
#[derive(Debug)]
pub struct SimWatchdog(pub(crate) Shared);

impl WatchdogOps for SimWatchdog {
    fn setup(&mut self, timeout_us: u32) {
        let mut state = self.0.borrow_mut();
        state.watchdog.timeout_us = Some(timeout_us);
        state.watchdog.since_reload_us = 0;
        state.record(SimEvent::WatchdogArmed { timeout_us });
    }

    fn reload(&mut self) {
        let mut state = self.0.borrow_mut();
        state.watchdog.since_reload_us = 0;
        state.watchdog.reloads += 1;
    }

    fn is_enabled(&self) -> bool {
        self.0.borrow().watchdog.timeout_us.is_some()
    }

    fn finalize(&mut self) {
        // Cannot be disabled once armed; stretch to "never" instead
        let mut state = self.0.borrow_mut();
        state.watchdog.stretched = true;
        state.record(SimEvent::WatchdogStretched);
    }
}

/// Buzzer
#[derive(Debug)]
pub struct SimBuzzer(pub(crate) Shared);

impl SoundOps for SimBuzzer {
    fn play_test(&mut self, _variant: u8) {
        let mut state = self.0.borrow_mut();
        for tone in SELF_TEST_MELODY {
            state.record(SimEvent::Tone {
                hz: tone.hz,
                duration_ms: tone.duration_ms,
            });
            state.clock_ms += u64::from(tone.gap_ms);
        }
    }
}

/// Settings EEPROM
#[derive(Debug)]
pub struct SimEeprom {
    pub(crate) state: Shared,
    pub(crate) opened: Option<usize>,
}

impl SimEeprom {
    fn region(&self) -> Result<usize, EepromError> {
        self.opened.ok_or(EepromError::NotInitialized)
    }
}

impl EepromOps for SimEeprom {
    fn capacity(&self) -> usize {
        self.state.borrow().eeprom.len()
    }

    fn begin(&mut self, size: usize) -> Result<(), EepromError> {
        let result = check_capacity(size, self.capacity());
        self.state.borrow_mut().record(SimEvent::EepromBegin {
            size,
            ok: result.is_ok(),
        });
        self.opened = None;
        result?;
        self.opened = Some(size);
        Ok(())
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(offset, buf.len(), self.region()?)?;
        let state = self.state.borrow();
        buf.copy_from_slice(&state.eeprom[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(offset, data.len(), self.region()?)?;
        let mut state = self.state.borrow_mut();
        state.eeprom[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        self.region()?;
        self.state.borrow_mut().record(SimEvent::EepromCommit);
        Ok(())
    }
}

/// SPI bus
#[derive(Debug)]
pub struct SimSpi(pub(crate) Shared);

impl SpiOps for SimSpi {
    fn begin(&mut self, _config: SpiConfig) {
        let mut state = self.0.borrow_mut();
        state.spi_open = true;
        state.record(SimEvent::SpiBegin);
    }

    fn end(&mut self) {
        let mut state = self.0.borrow_mut();
        state.spi_open = false;
        state.record(SimEvent::SpiEnd);
    }
}

/// Secondary serial port
#[derive(Debug)]
pub struct SimSerial(pub(crate) Shared);

impl SerialOps for SimSerial {
    fn begin(&mut self, baud: u32) {
        let mut state = self.0.borrow_mut();
        state.serial_open = true;
        state.record(SimEvent::SerialBegin { baud });
    }

    fn enable_rx(&mut self, enabled: bool) {
        self.0.borrow_mut().record(SimEvent::SerialRx { enabled });
    }

    fn end(&mut self) {
        let mut state = self.0.borrow_mut();
        state.serial_open = false;
        state.record(SimEvent::SerialEnd);
    }
}

/// UAT receiver port
#[derive(Debug)]
pub struct SimUat(pub(crate) Shared);

impl UatOps for SimUat {
    fn begin(&mut self, baud: u32) {
        self.0.borrow_mut().record(SimEvent::UatBegin { baud });
    }

    fn restart_module(&mut self) {
        let mut state = self.0.borrow_mut();
        state.clock_ms += 200;
        state.record(SimEvent::UatRestart);
    }
}

/// Generic lifecycle peripheral: battery, button, USB, Bluetooth
#[derive(Debug)]
pub struct SimPeripheral {
    pub(crate) state: Shared,
    pub(crate) kind: Peripheral,
}

impl Lifecycle for SimPeripheral {
    type Status = ();

    fn setup(&mut self) {
        self.state.borrow_mut().record(SimEvent::Setup(self.kind));
    }

    fn finalize(&mut self) {
        self.state.borrow_mut().record(SimEvent::Finalize(self.kind));
    }
}

impl BatteryOps for SimPeripheral {
    fn voltage(&mut self) -> f32 {
        self.state.borrow().battery_volts
    }
}

impl ButtonOps for SimPeripheral {}

impl IoDevice for SimPeripheral {
    fn name(&self) -> &'static str {
        match self.kind {
            Peripheral::Bluetooth => "Sim Bluetooth",
            _ => "Sim USBSerial",
        }
    }

    fn available(&mut self) -> usize {
        let state = self.state.borrow();
        match self.kind {
            Peripheral::Bluetooth => state.bt_rx.len(),
            _ => state.usb_rx.len(),
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut state = self.state.borrow_mut();
        match self.kind {
            Peripheral::Bluetooth => state.bt_rx.pop_front(),
            _ => state.usb_rx.pop_front(),
        }
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let mut state = self.state.borrow_mut();
        match self.kind {
            Peripheral::Bluetooth => state.bt_tx.extend_from_slice(data),
            _ => state.usb_tx.extend_from_slice(data),
        }
        data.len()
    }
}

/// Alternate network transport
#[derive(Debug)]
pub struct SimNetwork(pub(crate) Shared);

impl NetworkOps for SimNetwork {
    fn set_param(&mut self, index: u8, value: i32) {
        self.0
            .borrow_mut()
            .record(SimEvent::NetworkParam { index, value });
    }

    fn transmit_udp(&mut self, port: u16, payload: &[u8]) {
        self.0.borrow_mut().record(SimEvent::UdpSent {
            port,
            len: payload.len(),
        });
    }
}

/// OLED panel
#[derive(Debug)]
pub struct SimDisplay {
    pub(crate) state: Shared,
    pub(crate) last_message: Option<String>,
}

impl Lifecycle for SimDisplay {
    type Status = DisplayKind;

    fn setup(&mut self) -> DisplayKind {
        self.state
            .borrow_mut()
            .record(SimEvent::Setup(Peripheral::Display));
        DisplayKind::Oled
    }

    fn finalize(&mut self) {
        self.state
            .borrow_mut()
            .record(SimEvent::Finalize(Peripheral::Display));
    }
}

impl DisplayOps for SimDisplay {
    fn farewell(&mut self, message: &str) {
        self.last_message = Some(message.to_owned());
    }
}

impl SimDisplay {
    /// Last farewell message shown
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

/// Satellite receiver timing
#[derive(Debug)]
pub struct SimGnss {
    pub(crate) state: Shared,
    pub(crate) marker: Arc<TimeMarker>,
}

impl GnssOps for SimGnss {
    fn on_pps_edge(&self) {
        let now = self.state.borrow().clock_ms;
        self.marker.mark(now as u32);
    }

    fn pps_marker(&self) -> u32 {
        self.marker.get()
    }
}

/// Barometric sensor bus
#[derive(Debug)]
pub struct SimBaro(pub(crate) Shared);

impl BaroOps for SimBaro {
    fn setup(&mut self) -> bool {
        let mut state = self.0.borrow_mut();
        state.record(SimEvent::BaroSetup);
        state.config.baro
    }
}
