//! PPS edge capture
//!
//! Runs on the EXTI interrupt path and stamps each rising edge into the
//! shared timestamp marker.

use aerotrack_hal::GnssOps;
use aerotrack_hal_stm32::Stm32Gnss;
use defmt::*;
use embassy_stm32::exti::ExtiInput;

#[embassy_executor::task]
pub async fn pps_task(mut pps: ExtiInput<'static>, gnss: Stm32Gnss) {
    info!("PPS task started");

    loop {
        pps.wait_for_rising_edge().await;
        gnss.on_pps_edge();
        trace!("PPS at {} ms", gnss.pps_marker());
    }
}
