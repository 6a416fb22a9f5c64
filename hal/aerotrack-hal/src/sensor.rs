//! Satellite timing and barometric sensor hooks

/// Satellite receiver timing hooks
pub trait GnssOps {
    /// Record a pulse-per-second edge
    ///
    /// Called from interrupt context, hence `&self`.
    fn on_pps_edge(&self);

    /// Tick count of the most recent PPS edge
    fn pps_marker(&self) -> u32;
}

/// Barometric pressure sensor
pub trait BaroOps {
    /// Prepare the sensor bus; returns `true` when probing may proceed
    fn setup(&mut self) -> bool;
}

impl BaroOps for crate::peripheral::Noop {
    fn setup(&mut self) -> bool {
        false
    }
}
