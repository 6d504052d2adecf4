//! Host-side simulation of the boot console hardware.
//!
//! A [`bus::SystemBus`] routes register accesses to simulated peripherals and
//! logs each one. The UART HAL runs against it unchanged through
//! [`bus::SharedBus`], which implements the HAL's `AddressSpace`.

pub mod board;
pub mod bus;
pub mod peripherals;
pub mod report;

use std::any::Any;

mod tests;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("Bus fault at {0:#x}")]
    BusFault(u64),
    #[error("Unsupported {width:?} access at {addr:#x}")]
    UnsupportedAccess { addr: u64, width: AccessWidth },
    #[error(transparent)]
    PollTimeout(#[from] ppcboot_uart::PollTimeout),
}

pub type SimResult<T> = Result<T, SimulationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessWidth {
    Byte,
    DoubleWord,
}

impl AccessWidth {
    pub fn bytes(self) -> u64 {
        match self {
            AccessWidth::Byte => 1,
            AccessWidth::DoubleWord => 8,
        }
    }
}

/// Trait representing a memory-mapped peripheral.
///
/// Reads take `&mut self`: on a UART they consume received data and advance
/// line timing.
pub trait Peripheral: std::fmt::Debug {
    fn read(&mut self, offset: u64, width: AccessWidth) -> SimResult<u64>;
    fn write(&mut self, offset: u64, width: AccessWidth, value: u64) -> SimResult<()>;
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}
