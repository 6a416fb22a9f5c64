//! Buzzer, battery monitor, PPS capture and SPI bus

use aerotrack_hal::spi::{Mode as BusMode, SpiConfig};
use aerotrack_hal::{
    BatteryOps, GnssOps, Lifecycle, SoundOps, SpiOps, TimeMarker, SELF_TEST_MELODY,
};
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Mode, Phase, Polarity, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::{block_for, Duration, Instant};
use portable_atomic::{AtomicU32, Ordering};

/// Bit-banged piezo buzzer
pub struct Stm32Buzzer {
    pin: Option<Output<'static>>,
}

impl Stm32Buzzer {
    pub fn new(pin: Option<Output<'static>>) -> Self {
        Self { pin }
    }
}

impl SoundOps for Stm32Buzzer {
    fn play_test(&mut self, _variant: u8) {
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        for tone in SELF_TEST_MELODY {
            let half_period = Duration::from_micros(500_000 / u64::from(tone.hz));
            let cycles = tone.hz * tone.duration_ms / 1000;
            for _ in 0..cycles {
                pin.set_high();
                block_for(half_period);
                pin.set_low();
                block_for(half_period);
            }
            block_for(Duration::from_millis(u64::from(
                tone.gap_ms.saturating_sub(tone.duration_ms),
            )));
        }
    }
}

/// Nominal internal reference voltage
pub const VREFINT_VOLTS: f32 = 1.224;

const ADC_FULL_SCALE: f32 = 4095.0;

/// Battery volts from a battery-pin conversion and a VREFINT conversion
///
/// `divider` is the board's resistor divider ratio.
pub fn volts_from_adc(raw: u16, vref_raw: u16, divider: f32) -> f32 {
    if vref_raw == 0 {
        return 0.0;
    }
    let vdda = VREFINT_VOLTS * ADC_FULL_SCALE / f32::from(vref_raw);
    f32::from(raw) * vdda / ADC_FULL_SCALE * divider
}

/// Latest battery reading, published by the ADC sampling task
pub struct BatterySample(AtomicU32);

impl BatterySample {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn publish(&self, volts: f32) {
        self.0.store(volts.to_bits(), Ordering::Relaxed);
    }

    pub fn volts(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for BatterySample {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Stm32Battery {
    sample: &'static BatterySample,
}

impl Stm32Battery {
    pub fn new(sample: &'static BatterySample) -> Self {
        Self { sample }
    }
}

impl Lifecycle for Stm32Battery {
    type Status = ();

    fn setup(&mut self) {
        debug!("battery {} V", self.sample.volts());
    }
}

impl BatteryOps for Stm32Battery {
    fn voltage(&mut self) -> f32 {
        self.sample.volts()
    }
}

/// PPS timestamp capture
///
/// The EXTI task calls [`GnssOps::on_pps_edge`] through a shared reference.
pub struct Stm32Gnss {
    marker: &'static TimeMarker,
}

impl Stm32Gnss {
    pub fn new(marker: &'static TimeMarker) -> Self {
        Self { marker }
    }
}

impl GnssOps for Stm32Gnss {
    fn on_pps_edge(&self) {
        self.marker.mark(Instant::now().as_millis() as u32);
    }

    fn pps_marker(&self) -> u32 {
        self.marker.get()
    }
}

/// Radio SPI bus
///
/// `end` drops the driver, which disables SPI2 and releases its pins.
pub struct Stm32Spi {
    bus: Option<Spi<'static, Blocking>>,
}

impl Stm32Spi {
    pub fn new(bus: Spi<'static, Blocking>) -> Self {
        Self { bus: Some(bus) }
    }

    /// The bus, for the radio driver; `None` once released
    pub fn bus(&mut self) -> Option<&mut Spi<'static, Blocking>> {
        self.bus.as_mut()
    }
}

fn bus_mode(mode: BusMode) -> Mode {
    Mode {
        polarity: if mode.idle_high() {
            Polarity::IdleHigh
        } else {
            Polarity::IdleLow
        },
        phase: if mode.capture_on_second() {
            Phase::CaptureOnSecondTransition
        } else {
            Phase::CaptureOnFirstTransition
        },
    }
}

impl SpiOps for Stm32Spi {
    fn begin(&mut self, config: SpiConfig) {
        let mut bus_config = spi::Config::default();
        bus_config.frequency = Hertz(config.frequency);
        bus_config.mode = bus_mode(config.mode);

        let Some(bus) = self.bus.as_mut() else {
            warn!("spi bus already released");
            return;
        };
        if bus.set_config(&bus_config).is_err() {
            warn!("spi config rejected");
        }
    }

    fn end(&mut self) {
        self.bus = None;
    }
}
