//! Aerotrack - Portable Airborne-Traffic Tracker Firmware
//!
//! Firmware binary for STM32L073-based trackers (T-Watch expansion board,
//! T-Motion dongle). Boots through the capability table, then runs the
//! superloop until the battery gives out.

#![no_std]
#![no_main]

use aerotrack_core::config::{probe_variant, BoardFeatures, BoardVariant};
use aerotrack_core::{Runtime, Startup};
use aerotrack_hal::TimeMarker;
use aerotrack_hal_stm32::{
    BatterySample, GnssControl, HeapRegion, Stm32Battery, Stm32Boot, Stm32Buzzer, Stm32Eeprom,
    Stm32Gnss, Stm32Parts, Stm32Platform, Stm32Power, Stm32Serial, Stm32Spi, Stm32Uat,
    Stm32Watchdog,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::adc::{self, Adc, AdcChannel};
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_stm32::peripherals::{ADC1, PB6, PB7, USART2, USART4};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, pac, Peri};
use embassy_time::{block_for, Duration, Ticker, Timer};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod tasks;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 4KB of the 20KB RAM
const HEAP_SIZE: usize = 4 * 1024;

/// Superloop period in milliseconds
const LOOP_INTERVAL_MS: u64 = 100;

/// Superloop iterations between battery checks
const BATTERY_CHECK_TICKS: u32 = (tasks::BATTERY_SAMPLE_INTERVAL_MS / LOOP_INTERVAL_MS) as u32;

/// Board selected in board.toml
const BOARD: &str = env!("AEROTRACK_BOARD");
const PROBE: &str = env!("AEROTRACK_PROBE");
const ADDRESS: &str = env!("AEROTRACK_ADDRESS");

bind_interrupts!(struct Irqs {
    USART2 => usart::BufferedInterruptHandler<USART2>;
    USART4_5 => usart::BufferedInterruptHandler<USART4>;
    ADC1_COMP => adc::InterruptHandler<ADC1>;
    EXTI4_15 => exti::InterruptHandler<embassy_stm32::interrupt::typelevel::EXTI4_15>;
});

static PPS_MARKER: TimeMarker = TimeMarker::new();
static BATTERY: BatterySample = BatterySample::new();

// UART buffers (must live forever)
static GNSS_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static GNSS_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static UAT_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static UAT_RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Aerotrack firmware starting...");

    let heap_start = init_heap();

    let p = embassy_stm32::init(Default::default());
    let core = unwrap!(cortex_m::Peripherals::take());
    info!("Peripherals initialized");

    let default = unwrap!(BoardVariant::from_name(BOARD));
    let variant = if PROBE == "1" {
        probe_board(default, p.PB6, p.PB7)
    } else {
        default
    };
    let board = variant.config();
    info!("Board: {}", board.name);

    // Only the wake transport exists until the boot action is handled
    let early = Stm32Boot::new(Stm32Power::new(core.SCB, board.pins.gnss_rx, pac::USART4));

    let startup = Runtime::boot(early, board, |early| {
        let battery_adc = Adc::new(p.ADC1, Irqs);
        spawner
            .spawn(tasks::battery_task(
                battery_adc,
                p.PC4.degrade_adc(),
                board.adc_divider,
                &BATTERY,
            ))
            .unwrap();

        let gnss_uart = unwrap!(BufferedUart::new(
            p.USART4,
            p.PC11, // RX
            p.PC10, // TX
            GNSS_TX_BUF.init([0; 64]),
            GNSS_RX_BUF.init([0; 256]),
            Irqs,
            usart::Config::default(),
        ));
        let gnss_control = board
            .has(BoardFeatures::GNSS_LEVEL_SHIFTER)
            .then(|| GnssControl {
                reset: Flex::new(p.PB2),
                level_shifter: Flex::new(p.PC6),
            });

        let uat_uart = unwrap!(BufferedUart::new(
            p.USART2,
            p.PA3, // RX
            p.PA2, // TX
            UAT_TX_BUF.init([0; 64]),
            UAT_RX_BUF.init([0; 512]),
            Irqs,
            usart::Config::default(),
        ));

        let parts = Stm32Parts {
            watchdog: Stm32Watchdog::new(p.IWDG),
            buzzer: Stm32Buzzer::new(Some(Output::new(p.PA8, Level::Low, Speed::Low))),
            eeprom: Stm32Eeprom::new(Flash::new_blocking(p.FLASH)),
            spi: Stm32Spi::new(Spi::new_blocking(
                p.SPI2,
                p.PB13,
                p.PB15,
                p.PB14,
                spi::Config::default(),
            )),
            serial: Stm32Serial::new(gnss_uart, pac::USART4, gnss_control),
            uat: Stm32Uat::new(uat_uart, Some(Flex::new(p.PA1))),
            battery: Stm32Battery::new(&BATTERY),
            gnss: Stm32Gnss::new(&PPS_MARKER),
            heap: HeapRegion {
                heap: &HEAP,
                start: heap_start,
                size: HEAP_SIZE as u32,
            },
            fixed_address: board.fixed_address.or_else(|| parse_address(ADDRESS)),
        };
        Stm32Platform::assemble(early, parts)
    });

    let mut runtime = match startup {
        Startup::Running(runtime) => runtime,
        Startup::Halted { report, .. } => {
            // Only reached if power-off returned
            warn!("halted after boot {}", report.boot_count);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    if board.has(BoardFeatures::PPS) {
        let pps = ExtiInput::new(p.PB5, p.EXTI5, Pull::None, Irqs);
        spawner
            .spawn(tasks::pps_task(pps, Stm32Gnss::new(&PPS_MARKER)))
            .unwrap();
    }

    // First battery sample
    Timer::after_millis(10).await;
    runtime.sound_test(0);
    info!("Entering superloop");

    let mut ticker = Ticker::every(Duration::from_millis(LOOP_INTERVAL_MS));
    let mut ticks: u32 = 0;
    loop {
        runtime.tick();

        ticks = ticks.wrapping_add(1);
        if ticks % BATTERY_CHECK_TICKS == 0 && runtime.battery_exhausted() {
            break;
        }

        ticker.next().await;
    }

    warn!("Battery exhausted at {} V", runtime.battery_voltage());
    runtime.shutdown("LOW BAT");
}

/// Tell the T-Motion dongle from the T-Watch board by the external I2C
/// pull-ups; the probe pins are released again on return
fn probe_board(
    default: BoardVariant,
    scl: Peri<'static, PB6>,
    sda: Peri<'static, PB7>,
) -> BoardVariant {
    let scl = Input::new(scl, Pull::Down);
    let sda = Input::new(sda, Pull::Down);
    let pins = default.config().pins;
    probe_variant(
        default,
        |pin| {
            block_for(Duration::from_millis(1));
            if pin == pins.scl {
                scl.is_high()
            } else {
                sda.is_high()
            }
        },
        |ms| block_for(Duration::from_millis(u64::from(ms))),
    )
}

/// Parse the hex address exported by build.rs
fn parse_address(hex: &str) -> Option<u32> {
    if hex.is_empty() {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Initialize the heap; returns its start address
fn init_heap() -> u32 {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        let start = HEAP_MEM.as_ptr() as usize;
        HEAP.init(start, HEAP_SIZE);
        start as u32
    }
}
