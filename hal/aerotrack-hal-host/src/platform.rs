//! Host capability table
//!
//! One [`HostBoot`] plus the [`HostPlatform`] assembled from it live for one
//! simulated boot session.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use aerotrack_core::diagnostics::estimate_free;
use aerotrack_core::identity;
use aerotrack_hal::{BootStage, Capability, Platform, PlatformContext, PlatformId, ResetFlags};

use crate::board::{Peripheral, SimBoard, SimEvent};
use crate::devices::{
    SimBaro, SimBuzzer, SimDisplay, SimEeprom, SimGnss, SimNetwork, SimPeripheral, SimPower,
    SimResetRegister, SimRetained, SimSerial, SimSpi, SimUat, SimWatchdog,
};

/// Identity reported by the simulated target
pub const HOST_PLATFORM: PlatformId = PlatformId {
    code: 0xF0,
    name: "Host",
};

/// Early boot parts of the simulated device
pub struct HostBoot {
    board: SimBoard,
    context: PlatformContext,
    reset_cause: SimResetRegister,
    retained: SimRetained,
    power: SimPower,
}

impl HostBoot {
    /// Start a boot session on the board
    pub fn new(board: &SimBoard) -> Self {
        let shared = &board.state;
        Self {
            board: board.clone(),
            context: PlatformContext::new(),
            reset_cause: SimResetRegister(shared.clone()),
            retained: SimRetained(shared.clone()),
            power: SimPower(shared.clone()),
        }
    }
}

impl BootStage for HostBoot {
    type ResetCause = SimResetRegister;
    type BootStore = SimRetained;
    type Power = SimPower;

    fn context(&self) -> &PlatformContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut PlatformContext {
        &mut self.context
    }

    fn reset_cause(&mut self) -> &mut SimResetRegister {
        &mut self.reset_cause
    }

    fn boot_store(&mut self) -> &mut SimRetained {
        &mut self.retained
    }

    fn power(&mut self) -> &mut SimPower {
        &mut self.power
    }
}

/// Simulated backend
pub struct HostPlatform {
    board: SimBoard,
    early: HostBoot,
    rng: SmallRng,
    watchdog: SimWatchdog,
    buzzer: SimBuzzer,
    network: SimNetwork,
    eeprom: SimEeprom,
    spi: SimSpi,
    serial: SimSerial,
    bluetooth: Option<SimPeripheral>,
    usb: Option<SimPeripheral>,
    display: SimDisplay,
    battery: SimPeripheral,
    gnss: SimGnss,
    baro: SimBaro,
    uat: SimUat,
    button: SimPeripheral,
}

impl HostPlatform {
    /// Start a boot session without running the boot protocol
    pub fn new(board: &SimBoard) -> Self {
        Self::assemble(HostBoot::new(board))
    }

    /// Build the remaining drivers on top of the early boot parts
    pub fn assemble(early: HostBoot) -> Self {
        let board = early.board.clone();
        let shared = &board.state;
        let config = board.config();
        let peripheral = |kind| SimPeripheral {
            state: shared.clone(),
            kind,
        };

        let chip_id = identity::chip_id(config.uid, config.fixed_address);
        shared.borrow_mut().record(SimEvent::DriversBuilt);

        Self {
            board: board.clone(),
            early,
            rng: SmallRng::seed_from_u64(u64::from(chip_id)),
            watchdog: SimWatchdog(shared.clone()),
            buzzer: SimBuzzer(shared.clone()),
            network: SimNetwork(shared.clone()),
            eeprom: SimEeprom {
                state: shared.clone(),
                opened: None,
            },
            spi: SimSpi(shared.clone()),
            serial: SimSerial(shared.clone()),
            bluetooth: config.bluetooth.then(|| peripheral(Peripheral::Bluetooth)),
            usb: config.usb.then(|| peripheral(Peripheral::Usb)),
            display: SimDisplay {
                state: shared.clone(),
                last_message: None,
            },
            battery: peripheral(Peripheral::Battery),
            gnss: SimGnss {
                state: shared.clone(),
                marker: board.pps(),
            },
            baro: SimBaro(shared.clone()),
            uat: SimUat(shared.clone()),
            button: peripheral(Peripheral::Button),
        }
    }

    /// The board this session runs on
    pub fn board(&self) -> &SimBoard {
        &self.board
    }

    /// Last farewell message the display showed
    pub fn farewell_message(&self) -> Option<&str> {
        self.display.last_message()
    }
}

impl Platform for HostPlatform {
    type Boot = HostBoot;
    type Watchdog = SimWatchdog;
    type Sound = SimBuzzer;
    type Network = SimNetwork;
    type Eeprom = SimEeprom;
    type Spi = SimSpi;
    type Serial = SimSerial;
    type Bluetooth = SimPeripheral;
    type IoDevice = SimPeripheral;
    type Display = SimDisplay;
    type Battery = SimPeripheral;
    type Gnss = SimGnss;
    type Baro = SimBaro;
    type Uat = SimUat;
    type Button = SimPeripheral;

    fn identity(&self) -> PlatformId {
        HOST_PLATFORM
    }

    fn setup(&mut self) {
        let seed = u64::from(self.chip_id()) << 32 | u64::from(self.context().boot_count());
        self.rng = SmallRng::seed_from_u64(seed);
        self.board.state.borrow_mut().record(SimEvent::PlatformSetup);
    }

    fn post_init(&mut self) {
        self.board.state.borrow_mut().record(SimEvent::PostInit);
    }

    fn finalize(&mut self) {
        self.board
            .state
            .borrow_mut()
            .record(SimEvent::PlatformFinalize);
    }

    fn reset(&mut self) {
        let mut state = self.board.state.borrow_mut();
        state.pending_reset |= ResetFlags::SOFTWARE;
        state.record(SimEvent::Reset);
    }

    fn chip_id(&self) -> u32 {
        let state = self.board.state.borrow();
        identity::chip_id(state.config.uid, state.config.fixed_address)
    }

    fn boot_stage(&self) -> &HostBoot {
        &self.early
    }

    fn boot_stage_mut(&mut self) -> &mut HostBoot {
        &mut self.early
    }

    fn free_heap(&self) -> u32 {
        estimate_free(&self.board.memory())
    }

    fn random(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn watchdog(&mut self) -> &mut SimWatchdog {
        &mut self.watchdog
    }

    fn sound(&mut self) -> &mut SimBuzzer {
        &mut self.buzzer
    }

    fn network(&mut self) -> &mut SimNetwork {
        &mut self.network
    }

    fn eeprom(&mut self) -> &mut SimEeprom {
        &mut self.eeprom
    }

    fn spi(&mut self) -> &mut SimSpi {
        &mut self.spi
    }

    fn serial(&mut self) -> &mut SimSerial {
        &mut self.serial
    }

    fn bluetooth(&mut self) -> Capability<&mut SimPeripheral> {
        self.bluetooth.as_mut().into()
    }

    fn io_device(&mut self) -> Capability<&mut SimPeripheral> {
        self.usb.as_mut().into()
    }

    fn display(&mut self) -> &mut SimDisplay {
        &mut self.display
    }

    fn battery(&mut self) -> &mut SimPeripheral {
        &mut self.battery
    }

    fn gnss(&self) -> &SimGnss {
        &self.gnss
    }

    fn baro(&mut self) -> &mut SimBaro {
        &mut self.baro
    }

    fn uat(&mut self) -> &mut SimUat {
        &mut self.uat
    }

    fn button(&mut self) -> &mut SimPeripheral {
        &mut self.button
    }
}
