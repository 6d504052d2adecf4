//! Microwatt "potato" console.
//!
//! Every register is 64 bits wide. The driver programs the clock divisor at
//! init and otherwise only polls STATUS. Line format is left at the
//! hardware default.

use bitflags::bitflags;

use crate::regs::RegisterFile;
use crate::uart::UartBackend;

pub const POTATO_UART_BASE: u64 = 0xc000_2000;

/// Processor clock feeding the UART, in Hz.
pub const PROC_FREQ: u64 = 50_000_000;
/// Console baud rate.
pub const UART_FREQ: u64 = 115_200;

pub mod reg {
    pub const TX: u64 = 0x00;
    pub const RX: u64 = 0x08;
    pub const STATUS: u64 = 0x10;
    pub const CLOCK_DIV: u64 = 0x18;
    /// Present in hardware, never enabled.
    pub const IRQ_EN: u64 = 0x20;
}

/// Size of the register block in bytes.
pub const REGISTER_SPAN: u64 = 0x28;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u64 {
        const RX_EMPTY = 0x01;
        const TX_EMPTY = 0x02;
        const RX_FULL = 0x04;
        const TX_FULL = 0x08;
    }
}

/// Clock divisor for `baud` given `proc_freq`: `proc_freq / (baud * 16) - 1`.
///
/// Saturates at zero when the requested baud rate is faster than the clock
/// can divide down to. A zero `baud`, or one too large to scale by 16, also
/// yields zero.
pub const fn clock_divisor(proc_freq: u64, baud: u64) -> u64 {
    match baud.checked_mul(16) {
        Some(rate) if rate != 0 => (proc_freq / rate).saturating_sub(1),
        _ => 0,
    }
}

/// Divisor programmed at boot.
pub const BOOT_CLOCK_DIVISOR: u64 = clock_divisor(PROC_FREQ, UART_FREQ);

#[derive(Debug)]
pub struct Potato<R> {
    regs: R,
    divisor: u64,
}

impl<R: RegisterFile> Potato<R> {
    /// Program the clock divisor and take ownership of the block.
    pub fn init(mut regs: R, proc_freq: u64, baud: u64) -> Self {
        let divisor = clock_divisor(proc_freq, baud);
        regs.write_u64(reg::CLOCK_DIV, divisor);
        debug!("potato clock divisor set to {}", divisor);
        Self { regs, divisor }
    }

    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    pub fn status(&mut self) -> Status {
        Status::from_bits_retain(self.regs.read_u64(reg::STATUS))
    }

    pub fn into_inner(self) -> R {
        self.regs
    }
}

impl<R: RegisterFile> UartBackend for Potato<R> {
    fn tx_full(&mut self) -> bool {
        self.status().contains(Status::TX_FULL)
    }

    fn rx_empty(&mut self) -> bool {
        self.status().contains(Status::RX_EMPTY)
    }

    fn read(&mut self) -> u8 {
        (self.regs.read_u64(reg::RX) & 0xff) as u8
    }

    fn write(&mut self, byte: u8) {
        self.regs.write_u64(reg::TX, u64::from(byte));
    }
}
