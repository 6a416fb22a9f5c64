//! Serial transports
//!
//! Three kinds of byte stream hang off the capability table: the secondary
//! serial port (GNSS), the auxiliary UAT receiver port, and pluggable IO
//! devices such as a USB virtual serial port or a Bluetooth SPP link.

use crate::capability::Absent;
use crate::peripheral::Lifecycle;

/// Secondary serial port (satellite receiver)
pub trait SerialOps {
    /// Open the port at the given baud rate
    ///
    /// Boards that gate the receiver behind level shifters or a reset line
    /// run their power-up sequence here.
    fn begin(&mut self, baud: u32);

    /// Enable or disable the receiver
    fn enable_rx(&mut self, enabled: bool);

    /// Close the port and power the receiver path down
    fn end(&mut self);
}

/// Auxiliary UAT receiver port
pub trait UatOps {
    /// Open the port at the given baud rate
    fn begin(&mut self, baud: u32);

    /// Pulse the module's enable line to restart it
    fn restart_module(&mut self);
}

/// Pluggable byte-stream transport
pub trait IoDevice: Lifecycle<Status = ()> {
    /// Human-readable transport name
    fn name(&self) -> &'static str;

    /// Bytes waiting to be read
    fn available(&mut self) -> usize;

    /// Read one byte, if any is waiting
    fn read_byte(&mut self) -> Option<u8>;

    /// Write bytes, returning how many were accepted
    fn write(&mut self, data: &[u8]) -> usize;
}

impl Lifecycle for Absent {
    type Status = ();

    fn setup(&mut self) {
        match *self {}
    }
}

impl IoDevice for Absent {
    fn name(&self) -> &'static str {
        match *self {}
    }

    fn available(&mut self) -> usize {
        match *self {}
    }

    fn read_byte(&mut self) -> Option<u8> {
        match *self {}
    }

    fn write(&mut self, _data: &[u8]) -> usize {
        match *self {}
    }
}
