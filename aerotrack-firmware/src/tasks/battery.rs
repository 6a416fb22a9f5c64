//! Battery sampling
//!
//! The L0 ADC only converts asynchronously, so the battery voltage is
//! sampled here and published for the platform's synchronous reader.

use aerotrack_hal_stm32::peripherals::volts_from_adc;
use aerotrack_hal_stm32::BatterySample;
use defmt::*;
use embassy_stm32::adc::{Adc, AnyAdcChannel};
use embassy_stm32::peripherals::ADC1;
use embassy_time::{Duration, Ticker};

/// Sample interval in milliseconds
pub const BATTERY_SAMPLE_INTERVAL_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn battery_task(
    mut adc: Adc<'static, ADC1>,
    mut pin: AnyAdcChannel<ADC1>,
    divider: f32,
    sample: &'static BatterySample,
) {
    info!("Battery task started");

    let mut vref = adc.enable_vref();
    let mut ticker = Ticker::every(Duration::from_millis(BATTERY_SAMPLE_INTERVAL_MS));

    loop {
        let vref_raw = adc.read(&mut vref).await;
        let raw = adc.read(&mut pin).await;
        sample.publish(volts_from_adc(raw, vref_raw, divider));

        ticker.next().await;
    }
}
