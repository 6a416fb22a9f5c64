//! STM32L0 backend for the Aerotrack capability table
//!
//! Implements [`aerotrack_hal::Platform`] for the STM32L0 family:
//!
//! - reset flags from `RCC_CSR`, boot registers in the RTC backup domain
//! - independent watchdog
//! - data EEPROM behind a RAM shadow
//! - buffered GNSS and UAT UARTs, bit-banged buzzer
//! - STOP mode with serial wake, STANDBY for power-off
//!
//! # Features
//!
//! - `stm32l073rz` - STM32L073RZ (T-Motion, T-Watch expansion board)
//! - `stm32l072cz` - STM32L072CZ
//! - `defmt` - Enable debug formatting support
//!
//! The firmware first builds a [`Stm32Boot`] for the boot protocol. Only
//! once that allows it does it build the remaining drivers from the
//! `embassy_stm32::init` output and hand them over in a [`Stm32Parts`].

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod eeprom;
pub mod memory;
pub mod peripherals;
pub mod platform;
pub mod power;
pub mod reset;
pub mod serial;
pub mod watchdog;

pub use eeprom::Stm32Eeprom;
pub use memory::HeapRegion;
pub use peripherals::{BatterySample, Stm32Battery, Stm32Buzzer, Stm32Gnss, Stm32Spi};
pub use platform::{uid_words, Stm32Boot, Stm32Parts, Stm32Platform, STM32_PLATFORM};
pub use power::Stm32Power;
pub use serial::{GnssControl, Stm32Serial, Stm32Uat};
pub use watchdog::Stm32Watchdog;
