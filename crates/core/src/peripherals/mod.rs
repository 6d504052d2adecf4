pub mod ns16550;
pub mod potato;

use std::collections::VecDeque;

use ppcboot_config::SerialLineConfig;

/// Line state shared by both simulated UARTs.
///
/// Transmitted bytes are captured in order. Received bytes come from a
/// queue. Stall and delay counters are measured in status-register reads:
/// each read reports the current state, then counts down.
#[derive(Debug, Default, Clone)]
pub struct SerialLine {
    tx: Vec<u8>,
    rx: VecDeque<u8>,
    tx_stall_polls: u32,
    rx_delay_polls: u32,
    tx_stall_left: u32,
    rx_delay_left: u32,
    status_reads: u64,
}

/// What one status read saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    pub tx_ready: bool,
    pub rx_ready: bool,
}

impl SerialLine {
    pub fn new(config: &SerialLineConfig) -> Self {
        Self {
            rx: config.rx_input.bytes().collect(),
            tx_stall_polls: config.tx_stall_polls,
            rx_delay_polls: config.rx_delay_polls,
            tx_stall_left: config.tx_stall_polls,
            rx_delay_left: config.rx_delay_polls,
            ..Default::default()
        }
    }

    pub fn poll_status(&mut self) -> LineState {
        self.status_reads += 1;
        let state = LineState {
            tx_ready: self.tx_stall_left == 0,
            rx_ready: self.rx_delay_left == 0 && !self.rx.is_empty(),
        };
        self.tx_stall_left = self.tx_stall_left.saturating_sub(1);
        self.rx_delay_left = self.rx_delay_left.saturating_sub(1);
        state
    }

    pub fn transmit(&mut self, byte: u8) {
        tracing::trace!("uart tx {:#04x}", byte);
        self.tx.push(byte);
        self.tx_stall_left = self.tx_stall_polls;
    }

    /// Pop the next received byte. Reading with nothing queued returns 0.
    pub fn receive(&mut self) -> u8 {
        match self.rx.pop_front() {
            Some(byte) => {
                self.rx_delay_left = self.rx_delay_polls;
                byte
            }
            None => 0,
        }
    }

    pub fn transcript(&self) -> &[u8] {
        &self.tx
    }

    pub fn status_reads(&self) -> u64 {
        self.status_reads
    }
}

/// Common view of the two UART models, for reports.
pub trait SerialDevice {
    fn line(&self) -> &SerialLine;
}
