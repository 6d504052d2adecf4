//! The polled transmit/receive protocol shared by both backends.

use crate::poll::{Poll, Spin};

/// Line terminator emitted by [`UartBackend::puts`].
pub const CRLF: &[u8] = b"\r\n";

/// Register-level operations every backend provides.
///
/// `read` and `write` do not check status. Callers confirm `rx_empty()` /
/// `tx_full()` first, which the provided methods do.
pub trait UartBackend {
    /// No room to accept another byte.
    fn tx_full(&mut self) -> bool;
    /// No received byte available.
    fn rx_empty(&mut self) -> bool;
    fn read(&mut self) -> u8;
    fn write(&mut self, byte: u8);

    /// Send `bytes` in order, waiting on `poll` before each one.
    fn send_with<P: Poll>(&mut self, bytes: &[u8], poll: &mut P) -> Result<(), P::Error> {
        for &byte in bytes {
            poll.wait_while(|| self.tx_full())?;
            self.write(byte);
        }
        Ok(())
    }

    /// Wait on `poll` for a byte, then return it.
    fn receive_with<P: Poll>(&mut self, poll: &mut P) -> Result<u8, P::Error> {
        poll.wait_while(|| self.rx_empty())?;
        Ok(self.read())
    }

    /// Blocking send. Never returns if the transmitter stays full.
    fn send(&mut self, bytes: &[u8]) {
        match self.send_with(bytes, &mut Spin) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Blocking receive. Never returns if nothing arrives.
    fn receive(&mut self) -> u8 {
        match self.receive_with(&mut Spin) {
            Ok(byte) => byte,
            Err(never) => match never {},
        }
    }

    /// Send `line` followed by `\r\n`, waiting on `poll`.
    fn puts_with<P: Poll>(&mut self, line: &str, poll: &mut P) -> Result<(), P::Error> {
        self.send_with(line.as_bytes(), poll)?;
        self.send_with(CRLF, poll)
    }

    /// Send `line` followed by `\r\n`.
    fn puts(&mut self, line: &str) {
        match self.puts_with(line, &mut Spin) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}
