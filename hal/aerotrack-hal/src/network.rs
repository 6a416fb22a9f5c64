//! Alternate network transport

/// Datagram transport used by protocol encoders when a target has one
///
/// Targets without a network stack implement both operations as no-ops.
pub trait NetworkOps {
    /// Set a transport parameter
    fn set_param(&mut self, index: u8, value: i32);

    /// Send a datagram on the given port
    fn transmit_udp(&mut self, port: u16, payload: &[u8]);
}

impl NetworkOps for crate::peripheral::Noop {
    fn set_param(&mut self, _index: u8, _value: i32) {}

    fn transmit_udp(&mut self, _port: u16, _payload: &[u8]) {}
}
