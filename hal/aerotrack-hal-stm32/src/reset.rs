//! Reset-cause flags and retained boot registers
//!
//! The reset flags live in `RCC_CSR` and are cleared with `RMVF`. The boot
//! store uses the RTC backup registers, which survive every reset except a
//! loss of power.

use aerotrack_hal::{BootIndex, BootStore, ResetCauseRegister, ResetFlags};
use embassy_stm32::pac::{PWR, RCC, RTC};

/// `RCC_CSR` reset flags
pub struct Stm32ResetRegister;

impl ResetCauseRegister for Stm32ResetRegister {
    fn read(&mut self) -> ResetFlags {
        let csr = RCC.csr().read();
        let mut flags = ResetFlags::empty();
        flags.set(ResetFlags::LOW_POWER, csr.lpwrrstf());
        flags.set(ResetFlags::WINDOW_WATCHDOG, csr.wwdgrstf());
        flags.set(ResetFlags::INDEPENDENT_WATCHDOG, csr.iwdgrstf());
        flags.set(ResetFlags::SOFTWARE, csr.sftrstf());
        flags.set(ResetFlags::POWER_ON, csr.porrstf());
        flags.set(ResetFlags::EXTERNAL_PIN, csr.pinrstf());
        flags
    }

    fn clear(&mut self) {
        RCC.csr().modify(|w| w.set_rmvf(true));
    }
}

/// Number of RTC backup registers on the L0 family
pub const BACKUP_REGISTERS: usize = 5;

/// RTC backup registers
pub struct Stm32BackupRegisters {
    _private: (),
}

impl Stm32BackupRegisters {
    /// Unlock the backup domain for writing
    pub fn new() -> Self {
        PWR.cr().modify(|w| w.set_dbp(true));
        Self { _private: () }
    }
}

impl Default for Stm32BackupRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl BootStore for Stm32BackupRegisters {
    fn read(&mut self, index: BootIndex) -> u32 {
        RTC.bkpr(index.as_usize()).read().bkp()
    }

    fn write(&mut self, index: BootIndex, value: u32) {
        RTC.bkpr(index.as_usize()).write(|w| w.set_bkp(value));
    }
}
