use std::any::Any;

use ppcboot_config::SerialLineConfig;
use ppcboot_uart::potato::{reg, Status};

use crate::peripherals::{SerialDevice, SerialLine};
use crate::{AccessWidth, Peripheral, SimResult, SimulationError};

/// Microwatt potato console model. Registers are 64-bit only.
#[derive(Debug, Default)]
pub struct PotatoConsole {
    line: SerialLine,
    clock_div: u64,
    irq_en: u64,
    clock_div_writes: u32,
}

impl PotatoConsole {
    pub fn new(config: &SerialLineConfig) -> Self {
        Self {
            line: SerialLine::new(config),
            ..Default::default()
        }
    }

    pub fn clock_divisor(&self) -> u64 {
        self.clock_div
    }

    /// Whether anything ever programmed the clock divisor.
    pub fn clock_programmed(&self) -> bool {
        self.clock_div_writes > 0
    }

    pub fn irq_enable(&self) -> u64 {
        self.irq_en
    }

    fn status(&mut self) -> Status {
        let state = self.line.poll_status();
        let mut status = Status::empty();
        if state.tx_ready {
            status |= Status::TX_EMPTY;
        } else {
            status |= Status::TX_FULL;
        }
        if !state.rx_ready {
            status |= Status::RX_EMPTY;
        }
        status
    }
}

impl SerialDevice for PotatoConsole {
    fn line(&self) -> &SerialLine {
        &self.line
    }
}

impl Peripheral for PotatoConsole {
    fn read(&mut self, offset: u64, width: AccessWidth) -> SimResult<u64> {
        if width != AccessWidth::DoubleWord {
            return Err(SimulationError::UnsupportedAccess { addr: offset, width });
        }
        Ok(match offset {
            reg::RX => u64::from(self.line.receive()),
            reg::STATUS => self.status().bits(),
            reg::CLOCK_DIV => self.clock_div,
            reg::IRQ_EN => self.irq_en,
            _ => 0,
        })
    }

    fn write(&mut self, offset: u64, width: AccessWidth, value: u64) -> SimResult<()> {
        if width != AccessWidth::DoubleWord {
            return Err(SimulationError::UnsupportedAccess { addr: offset, width });
        }
        match offset {
            reg::TX => self.line.transmit(value as u8),
            reg::CLOCK_DIV => {
                self.clock_div = value;
                self.clock_div_writes += 1;
            }
            reg::IRQ_EN => self.irq_en = value,
            _ => {}
        }
        Ok(())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
