//! Simulated board
//!
//! [`SimBoard`] is the physical device: retained registers, reset-cause
//! flags, EEPROM, RAM and the watchdog counter. A [`crate::HostPlatform`]
//! is one boot session on top of it. Dropping the platform and calling
//! [`SimBoard::reboot`] simulates the reset that ends the session.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use aerotrack_core::diagnostics::MemorySnapshot;
use aerotrack_hal::{ResetFlags, TimeMarker};

/// Number of retained 32-bit registers
pub const RETAINED_REGISTERS: usize = 5;

/// Flavor of the simulated watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogKind {
    /// Expiry latches the window-watchdog flag
    Window,
    /// Expiry latches the independent-watchdog flag
    Independent,
}

impl WatchdogKind {
    fn reset_flag(self) -> ResetFlags {
        match self {
            WatchdogKind::Window => ResetFlags::WINDOW_WATCHDOG,
            WatchdogKind::Independent => ResetFlags::INDEPENDENT_WATCHDOG,
        }
    }
}

/// Peripherals with a lifecycle triad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    Battery,
    Button,
    Display,
    Usb,
    Bluetooth,
}

/// Hardware-visible operations, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    ResetFlagsCleared,
    RetainedWrite { index: usize, value: u32 },
    ArmSerialWake,
    /// Device suspended; `action` is the boot action register at that moment
    DeepSleep { action: u32 },
    DrainWake { bytes: usize },
    PowerOff,
    /// Drivers beyond the early boot parts were constructed
    DriversBuilt,
    PlatformSetup,
    PostInit,
    PlatformFinalize,
    Reset,
    Setup(Peripheral),
    Finalize(Peripheral),
    EepromBegin { size: usize, ok: bool },
    EepromCommit,
    SpiBegin,
    SpiEnd,
    SerialBegin { baud: u32 },
    SerialEnd,
    SerialRx { enabled: bool },
    UatBegin { baud: u32 },
    UatRestart,
    BaroSetup,
    NetworkParam { index: u8, value: i32 },
    UdpSent { port: u16, len: usize },
    WatchdogArmed { timeout_us: u32 },
    WatchdogStretched,
    Tone { hz: u32, duration_ms: u32 },
}

/// Simulated RAM layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimRam {
    pub base: u32,
    pub size: u32,
    /// Bytes reserved for the stack below the top of RAM
    pub min_stack: u32,
    /// Start of the heap region
    pub heap_start: u32,
}

impl Default for SimRam {
    fn default() -> Self {
        Self {
            base: 0x2000_0000,
            size: 20 * 1024,
            min_stack: 0x400,
            heap_start: 0x2000_1000,
        }
    }
}

/// Static description of the simulated device
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// 96-bit unique id
    pub uid: [u32; 3],
    /// Fixed address overriding the derived chip id
    pub fixed_address: Option<u32>,
    pub eeprom_capacity: usize,
    pub watchdog: WatchdogKind,
    /// USB serial device present
    pub usb: bool,
    /// Bluetooth module present
    pub bluetooth: bool,
    /// Barometric sensor present
    pub baro: bool,
    /// Battery voltage at power-on
    pub battery_volts: f32,
    pub ram: SimRam,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            uid: [0x0031_0042, 0x3235_5110, 0x2036_3650],
            fixed_address: None,
            eeprom_capacity: 6 * 1024,
            watchdog: WatchdogKind::Window,
            usb: false,
            bluetooth: false,
            baro: true,
            battery_volts: 3.9,
            ram: SimRam::default(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct WatchdogState {
    pub timeout_us: Option<u32>,
    pub since_reload_us: u64,
    pub reloads: u32,
    pub stretched: bool,
}

#[derive(Debug)]
pub(crate) struct HeapState {
    pub heap_end: u32,
    pub fragments_free: u32,
    pub stack_pointer: u32,
}

/// Mutable device state shared by every simulated peripheral
#[derive(Debug)]
pub(crate) struct BoardState {
    pub config: SimConfig,
    pub retained: [u32; RETAINED_REGISTERS],
    pub reset_flags: ResetFlags,
    pub pending_reset: ResetFlags,
    pub eeprom: Vec<u8>,
    pub clock_ms: u64,
    pub serial_rx: VecDeque<u8>,
    pub usb_rx: VecDeque<u8>,
    pub usb_tx: Vec<u8>,
    pub bt_rx: VecDeque<u8>,
    pub bt_tx: Vec<u8>,
    pub serial_open: bool,
    pub spi_open: bool,
    pub watchdog: WatchdogState,
    pub heap: HeapState,
    pub battery_volts: f32,
    pub halted: bool,
    pub events: Vec<SimEvent>,
}

impl BoardState {
    pub fn record(&mut self, event: SimEvent) {
        log::trace!("sim: {:?}", event);
        self.events.push(event);
    }

    fn fresh_heap(ram: &SimRam) -> HeapState {
        HeapState {
            heap_end: ram.heap_start,
            fragments_free: 0,
            stack_pointer: ram.base + ram.size - 0x100,
        }
    }

    /// Volatile state lost on any reset
    fn clear_volatile(&mut self) {
        self.watchdog = WatchdogState::default();
        self.heap = Self::fresh_heap(&self.config.ram);
        self.serial_rx.clear();
        self.usb_rx.clear();
        self.usb_tx.clear();
        self.bt_rx.clear();
        self.bt_tx.clear();
        self.serial_open = false;
        self.spi_open = false;
        self.halted = false;
        self.pending_reset = ResetFlags::empty();
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let ram = &self.config.ram;
        MemorySnapshot {
            stack_pointer: self.heap.stack_pointer,
            stack_floor: ram.base + ram.size - ram.min_stack,
            heap_end: self.heap.heap_end,
            allocator_free: self.heap.fragments_free,
            total_ram: ram.size,
        }
    }
}

/// The simulated physical device
///
/// Cloning yields another handle to the same device.
#[derive(Debug, Clone)]
pub struct SimBoard {
    pub(crate) state: Rc<RefCell<BoardState>>,
    pub(crate) pps: Arc<TimeMarker>,
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimBoard {
    /// Apply power to a factory-fresh device
    pub fn new(config: SimConfig) -> Self {
        let eeprom = vec![0xFF; config.eeprom_capacity];
        let heap = BoardState::fresh_heap(&config.ram);
        let battery_volts = config.battery_volts;

        let state = BoardState {
            config,
            retained: [0; RETAINED_REGISTERS],
            reset_flags: ResetFlags::POWER_ON | ResetFlags::EXTERNAL_PIN,
            pending_reset: ResetFlags::empty(),
            eeprom,
            clock_ms: 0,
            serial_rx: VecDeque::new(),
            usb_rx: VecDeque::new(),
            usb_tx: Vec::new(),
            bt_rx: VecDeque::new(),
            bt_tx: Vec::new(),
            serial_open: false,
            spi_open: false,
            watchdog: WatchdogState::default(),
            heap,
            battery_volts,
            halted: false,
            events: Vec::new(),
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            pps: Arc::new(TimeMarker::new()),
        }
    }

    /// Remove and restore power
    ///
    /// Retained registers are lost; the EEPROM keeps its contents.
    pub fn power_cycle(&self) {
        let mut state = self.state.borrow_mut();
        state.clear_volatile();
        state.retained = [0; RETAINED_REGISTERS];
        state.reset_flags = ResetFlags::POWER_ON | ResetFlags::EXTERNAL_PIN;
        log::debug!("sim: power cycle");
    }

    /// Assert the external reset pin
    pub fn press_reset(&self) {
        let mut state = self.state.borrow_mut();
        state.clear_volatile();
        state.reset_flags |= ResetFlags::EXTERNAL_PIN;
        log::debug!("sim: reset pin");
    }

    /// Complete a reset requested by software or by the watchdog
    ///
    /// Returns `false` (and changes nothing) when no reset is pending.
    pub fn reboot(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let pending = state.pending_reset;
        if pending.is_empty() {
            return false;
        }
        state.clear_volatile();
        state.reset_flags |= pending;
        log::debug!("sim: reboot, latched {:?}", pending);
        true
    }

    /// Let time pass without servicing anything
    ///
    /// Returns `true` if the watchdog expired.
    pub fn advance(&self, ms: u32) -> bool {
        let mut state = self.state.borrow_mut();
        state.clock_ms += u64::from(ms);

        let kind = state.config.watchdog;
        let wd = &mut state.watchdog;
        let Some(timeout_us) = wd.timeout_us else {
            return false;
        };
        if wd.stretched {
            return false;
        }
        wd.since_reload_us += u64::from(ms) * 1000;
        if wd.since_reload_us > u64::from(timeout_us) {
            state.pending_reset |= kind.reset_flag();
            log::debug!("sim: watchdog bite");
            return true;
        }
        false
    }

    /// Replace the latched reset flags
    pub fn set_reset_flags(&self, flags: ResetFlags) {
        self.state.borrow_mut().reset_flags = flags;
    }

    /// Feed bytes into the secondary serial receiver
    pub fn queue_serial_rx(&self, bytes: &[u8]) {
        self.state.borrow_mut().serial_rx.extend(bytes);
    }

    /// Feed bytes into the USB serial receiver
    pub fn queue_usb_rx(&self, bytes: &[u8]) {
        self.state.borrow_mut().usb_rx.extend(bytes);
    }

    /// Bytes the firmware wrote to USB serial
    pub fn usb_tx(&self) -> Vec<u8> {
        self.state.borrow().usb_tx.clone()
    }

    /// Feed bytes into the Bluetooth receiver
    pub fn queue_bt_rx(&self, bytes: &[u8]) {
        self.state.borrow_mut().bt_rx.extend(bytes);
    }

    /// Bytes the firmware wrote to Bluetooth
    pub fn bt_tx(&self) -> Vec<u8> {
        self.state.borrow().bt_tx.clone()
    }

    /// Check if the secondary serial port is open
    pub fn serial_open(&self) -> bool {
        self.state.borrow().serial_open
    }

    /// Check if the SPI bus is claimed
    pub fn spi_open(&self) -> bool {
        self.state.borrow().spi_open
    }

    /// Retained register contents
    pub fn retained(&self, index: usize) -> u32 {
        self.state.borrow().retained[index]
    }

    /// Currently latched reset flags
    pub fn reset_flags(&self) -> ResetFlags {
        self.state.borrow().reset_flags
    }

    /// Raw EEPROM contents
    pub fn eeprom(&self) -> Vec<u8> {
        self.state.borrow().eeprom.clone()
    }

    /// Overwrite EEPROM contents starting at `offset`
    pub fn write_eeprom(&self, offset: usize, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        state.eeprom[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Set the battery voltage
    pub fn set_battery_volts(&self, volts: f32) {
        self.state.borrow_mut().battery_volts = volts;
    }

    /// Claim heap memory (moves the heap end up)
    pub fn grow_heap(&self, bytes: u32) {
        self.state.borrow_mut().heap.heap_end += bytes;
    }

    /// Return memory to the allocator's free list without shrinking the heap
    pub fn free_fragment(&self, bytes: u32) {
        self.state.borrow_mut().heap.fragments_free += bytes;
    }

    /// Move the stack pointer
    pub fn set_stack_pointer(&self, sp: u32) {
        self.state.borrow_mut().heap.stack_pointer = sp;
    }

    /// Current memory snapshot
    pub fn memory(&self) -> MemorySnapshot {
        self.state.borrow().snapshot()
    }

    /// Watchdog reloads since it was armed
    pub fn watchdog_reloads(&self) -> u32 {
        self.state.borrow().watchdog.reloads
    }

    /// Configured watchdog timeout, if armed
    pub fn watchdog_timeout(&self) -> Option<u32> {
        self.state.borrow().watchdog.timeout_us
    }

    /// Check if the device is in the lowest-power halt
    pub fn is_halted(&self) -> bool {
        self.state.borrow().halted
    }

    /// Operations recorded since the last [`SimBoard::take_events`]
    pub fn take_events(&self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    /// Check if an event was recorded (without consuming)
    pub fn saw(&self, event: SimEvent) -> bool {
        self.state.borrow().events.contains(&event)
    }

    /// PPS marker shared with the interrupt producer
    pub fn pps(&self) -> Arc<TimeMarker> {
        Arc::clone(&self.pps)
    }

    /// Simulated milliseconds since power-on
    pub fn now_ms(&self) -> u64 {
        self.state.borrow().clock_ms
    }

    /// Device configuration
    pub fn config(&self) -> SimConfig {
        self.state.borrow().config.clone()
    }
}
