//! STM32L0 capability table

use aerotrack_core::identity;
use aerotrack_hal::{
    Absent, BootStage, Capability, NoDisplay, Noop, Platform, PlatformContext, PlatformId,
};
use cortex_m::peripheral::SCB;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::eeprom::Stm32Eeprom;
use crate::memory::HeapRegion;
use crate::peripherals::{Stm32Battery, Stm32Buzzer, Stm32Gnss, Stm32Spi};
use crate::power::Stm32Power;
use crate::reset::{Stm32BackupRegisters, Stm32ResetRegister};
use crate::serial::{Stm32Serial, Stm32Uat};
use crate::watchdog::Stm32Watchdog;

pub const STM32_PLATFORM: PlatformId = PlatformId {
    code: 5,
    name: "STM32",
};

/// Reset flags, backup registers and low-power control
///
/// The only parts that exist while the boot action is handled.
pub struct Stm32Boot {
    context: PlatformContext,
    reset_cause: Stm32ResetRegister,
    backup: Stm32BackupRegisters,
    power: Stm32Power,
}

impl Stm32Boot {
    pub fn new(power: Stm32Power) -> Self {
        Self {
            context: PlatformContext::new(),
            reset_cause: Stm32ResetRegister,
            backup: Stm32BackupRegisters::new(),
            power,
        }
    }
}

impl BootStage for Stm32Boot {
    type ResetCause = Stm32ResetRegister;
    type BootStore = Stm32BackupRegisters;
    type Power = Stm32Power;

    fn context(&self) -> &PlatformContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut PlatformContext {
        &mut self.context
    }

    fn reset_cause(&mut self) -> &mut Stm32ResetRegister {
        &mut self.reset_cause
    }

    fn boot_store(&mut self) -> &mut Stm32BackupRegisters {
        &mut self.backup
    }

    fn power(&mut self) -> &mut Stm32Power {
        &mut self.power
    }
}

/// Drivers the firmware builds once the boot action allows it
pub struct Stm32Parts {
    pub watchdog: Stm32Watchdog,
    pub buzzer: Stm32Buzzer,
    pub eeprom: Stm32Eeprom,
    pub spi: Stm32Spi,
    pub serial: Stm32Serial,
    pub uat: Stm32Uat,
    pub battery: Stm32Battery,
    pub gnss: Stm32Gnss,
    pub heap: HeapRegion,
    /// Board-level fixed address overriding the derived chip id
    pub fixed_address: Option<u32>,
}

pub struct Stm32Platform {
    early: Stm32Boot,
    rng: SmallRng,
    chip_id: u32,
    heap: HeapRegion,
    watchdog: Stm32Watchdog,
    buzzer: Stm32Buzzer,
    network: Noop,
    eeprom: Stm32Eeprom,
    spi: Stm32Spi,
    serial: Stm32Serial,
    display: NoDisplay,
    battery: Stm32Battery,
    gnss: Stm32Gnss,
    baro: Noop,
    uat: Stm32Uat,
    button: Noop,
}

/// The 96-bit unique id as three little-endian words
pub fn uid_words() -> [u32; 3] {
    let bytes = embassy_stm32::uid::uid();
    let word = |i: usize| {
        u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
    };
    [word(0), word(4), word(8)]
}

impl Stm32Platform {
    pub fn assemble(early: Stm32Boot, parts: Stm32Parts) -> Self {
        let chip_id = identity::chip_id(uid_words(), parts.fixed_address);
        Self {
            early,
            rng: SmallRng::seed_from_u64(u64::from(chip_id)),
            chip_id,
            heap: parts.heap,
            watchdog: parts.watchdog,
            buzzer: parts.buzzer,
            network: Noop,
            eeprom: parts.eeprom,
            spi: parts.spi,
            serial: parts.serial,
            display: NoDisplay,
            battery: parts.battery,
            gnss: parts.gnss,
            baro: Noop,
            uat: parts.uat,
            button: Noop,
        }
    }

    /// GNSS port, for the NMEA reader
    pub fn gnss_port(&mut self) -> &mut Stm32Serial {
        &mut self.serial
    }
}

impl Platform for Stm32Platform {
    type Boot = Stm32Boot;
    type Watchdog = Stm32Watchdog;
    type Sound = Stm32Buzzer;
    type Network = Noop;
    type Eeprom = Stm32Eeprom;
    type Spi = Stm32Spi;
    type Serial = Stm32Serial;
    type Bluetooth = Absent;
    type IoDevice = Absent;
    type Display = NoDisplay;
    type Battery = Stm32Battery;
    type Gnss = Stm32Gnss;
    type Baro = Noop;
    type Uat = Stm32Uat;
    type Button = Noop;

    fn identity(&self) -> PlatformId {
        STM32_PLATFORM
    }

    fn setup(&mut self) {
        let seed = u64::from(self.chip_id) << 32 | u64::from(self.context().boot_count());
        self.rng = SmallRng::seed_from_u64(seed);
    }

    fn post_init(&mut self) {
        info!(
            "reset: {}, {}",
            self.reset_reason().as_str(),
            self.reset_details()
        );
    }

    fn reset(&mut self) {
        SCB::sys_reset();
    }

    fn chip_id(&self) -> u32 {
        self.chip_id
    }

    fn boot_stage(&self) -> &Stm32Boot {
        &self.early
    }

    fn boot_stage_mut(&mut self) -> &mut Stm32Boot {
        &mut self.early
    }

    fn free_heap(&self) -> u32 {
        aerotrack_core::diagnostics::estimate_free(&self.heap.snapshot())
    }

    fn random(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn watchdog(&mut self) -> &mut Stm32Watchdog {
        &mut self.watchdog
    }

    fn sound(&mut self) -> &mut Stm32Buzzer {
        &mut self.buzzer
    }

    fn network(&mut self) -> &mut Noop {
        &mut self.network
    }

    fn eeprom(&mut self) -> &mut Stm32Eeprom {
        &mut self.eeprom
    }

    fn spi(&mut self) -> &mut Stm32Spi {
        &mut self.spi
    }

    fn serial(&mut self) -> &mut Stm32Serial {
        &mut self.serial
    }

    fn bluetooth(&mut self) -> Capability<&mut Absent> {
        Capability::Unsupported
    }

    fn io_device(&mut self) -> Capability<&mut Absent> {
        Capability::Unsupported
    }

    fn display(&mut self) -> &mut NoDisplay {
        &mut self.display
    }

    fn battery(&mut self) -> &mut Stm32Battery {
        &mut self.battery
    }

    fn gnss(&self) -> &Stm32Gnss {
        &self.gnss
    }

    fn baro(&mut self) -> &mut Noop {
        &mut self.baro
    }

    fn uat(&mut self) -> &mut Stm32Uat {
        &mut self.uat
    }

    fn button(&mut self) -> &mut Noop {
        &mut self.button
    }
}
