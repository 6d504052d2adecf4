use std::any::Any;

use ppcboot_config::SerialLineConfig;
use ppcboot_uart::ns16550::{reg, LineStatus, LCR_DLAB};

use crate::peripherals::{SerialDevice, SerialLine};
use crate::{AccessWidth, Peripheral, SimResult, SimulationError};

/// IIR value meaning "no interrupt pending".
const IIR_NO_INT: u64 = 0x01;

/// 16550 model as QEMU presents it: byte registers, always configured.
#[derive(Debug, Default)]
pub struct Ns16550 {
    line: SerialLine,
    ier: u8,
    lcr: u8,
    mcr: u8,
    scr: u8,
    dll: u8,
    dlm: u8,
}

impl Ns16550 {
    pub fn new(config: &SerialLineConfig) -> Self {
        Self {
            line: SerialLine::new(config),
            ..Default::default()
        }
    }

    fn dlab(&self) -> bool {
        self.lcr & LCR_DLAB != 0
    }

    pub fn divisor_latch(&self) -> u16 {
        u16::from_le_bytes([self.dll, self.dlm])
    }

    fn line_status(&mut self) -> LineStatus {
        let state = self.line.poll_status();
        let mut lsr = LineStatus::empty();
        if state.tx_ready {
            lsr |= LineStatus::THRE | LineStatus::TEMT;
        }
        if state.rx_ready {
            lsr |= LineStatus::DR;
        }
        lsr
    }
}

impl SerialDevice for Ns16550 {
    fn line(&self) -> &SerialLine {
        &self.line
    }
}

impl Peripheral for Ns16550 {
    fn read(&mut self, offset: u64, width: AccessWidth) -> SimResult<u64> {
        if width != AccessWidth::Byte {
            return Err(SimulationError::UnsupportedAccess { addr: offset, width });
        }
        let value = match offset {
            reg::DLL if self.dlab() => self.dll,
            reg::RBR => self.line.receive(),
            reg::DLM if self.dlab() => self.dlm,
            reg::IER => self.ier,
            reg::IIR => IIR_NO_INT as u8,
            reg::LCR => self.lcr,
            reg::MCR => self.mcr,
            reg::LSR => self.line_status().bits(),
            reg::SCR => self.scr,
            // MSR and anything past the block
            _ => 0,
        };
        Ok(u64::from(value))
    }

    fn write(&mut self, offset: u64, width: AccessWidth, value: u64) -> SimResult<()> {
        if width != AccessWidth::Byte {
            return Err(SimulationError::UnsupportedAccess { addr: offset, width });
        }
        let value = value as u8;
        match offset {
            reg::DLL if self.dlab() => self.dll = value,
            reg::THR => self.line.transmit(value),
            reg::DLM if self.dlab() => self.dlm = value,
            reg::IER => self.ier = value,
            reg::LCR => self.lcr = value,
            reg::MCR => self.mcr = value,
            reg::SCR => self.scr = value,
            // FCR included: no FIFOs modelled
            _ => {}
        }
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
