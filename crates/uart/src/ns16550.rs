//! 16550-compatible serial port, as emulated by QEMU.
//!
//! Registers are one byte wide. Only RBR/THR and LSR are touched by the
//! driver; the emulator comes up with the line already configured.

use bitflags::bitflags;

use crate::regs::RegisterFile;
use crate::uart::UartBackend;

/// Base of the 16550 in the QEMU PowerNV machine's address map.
pub const QEMU_UART_BASE: u64 = 0x6_0300_d001_03f8;

/// Register offsets. Several share an address and are told apart by
/// direction or by `LCR.DLAB`.
pub mod reg {
    pub const RBR: u64 = 0;
    pub const THR: u64 = 0;
    pub const DLL: u64 = 0;
    pub const IER: u64 = 1;
    pub const DLM: u64 = 1;
    pub const FCR: u64 = 2;
    pub const IIR: u64 = 2;
    pub const LCR: u64 = 3;
    pub const MCR: u64 = 4;
    pub const LSR: u64 = 5;
    pub const MSR: u64 = 6;
    pub const SCR: u64 = 7;
}

/// Size of the register block in bytes.
pub const REGISTER_SPAN: u64 = 8;

bitflags! {
    /// Line status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// Data ready
        const DR = 0x01;
        /// Overrun
        const OE = 0x02;
        /// Parity error
        const PE = 0x04;
        /// Framing error
        const FE = 0x08;
        /// Break
        const BI = 0x10;
        /// Transmit holding register empty
        const THRE = 0x20;
        /// Transmitter empty
        const TEMT = 0x40;
        const ERR = 0x80;
    }
}

/// `LCR` bit that switches offsets 0 and 1 to the divisor latch.
pub const LCR_DLAB: u8 = 0x80;

#[derive(Debug)]
pub struct Ns16550<R> {
    regs: R,
}

impl<R: RegisterFile> Ns16550<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    pub fn line_status(&mut self) -> LineStatus {
        LineStatus::from_bits_retain(self.regs.read_u8(reg::LSR))
    }

    pub fn into_inner(self) -> R {
        self.regs
    }
}

impl<R: RegisterFile> UartBackend for Ns16550<R> {
    fn tx_full(&mut self) -> bool {
        !self.line_status().contains(LineStatus::THRE)
    }

    fn rx_empty(&mut self) -> bool {
        !self.line_status().contains(LineStatus::DR)
    }

    fn read(&mut self) -> u8 {
        self.regs.read_u8(reg::RBR)
    }

    fn write(&mut self, byte: u8) {
        self.regs.write_u8(reg::THR, byte);
    }
}
