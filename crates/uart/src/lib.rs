//! Polled UART console for PowerPC boot firmware.
//!
//! Two backends live here: the Microwatt "potato" console and the 16550
//! serial port that QEMU emulates. Boot code picks one with [`Console::init`]
//! and every later byte goes through the returned handle.
//!
//! The crate is `no_std`. All device access goes through the
//! [`RegisterFile`] capability so the same code runs against real MMIO on
//! the target and against a simulated register bus on the host.

#![cfg_attr(not(test), no_std)]

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
    }};
}

pub mod boot;
pub mod console;
pub mod ns16550;
pub mod poll;
pub mod potato;
pub mod regs;
pub mod uart;

#[cfg(test)]
mod testing;

pub use boot::{announce, announce_with, BANNER};
pub use console::Console;
pub use ns16550::Ns16550;
pub use poll::{Bounded, Poll, PollTimeout, Spin};
pub use potato::Potato;
pub use regs::{AddressSpace, Mmio, PhysicalMemory, RegisterFile};
pub use uart::UartBackend;
