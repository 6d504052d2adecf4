//! Runtime selection between the two backends.

use core::fmt;

use crate::ns16550::{Ns16550, QEMU_UART_BASE};
use crate::potato::{Potato, POTATO_UART_BASE, PROC_FREQ, UART_FREQ};
use crate::regs::{AddressSpace, RegisterFile};
use crate::uart::UartBackend;

/// Which console hardware the boot code found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKind {
    Qemu,
    Potato,
}

/// The boot console. Built once by [`Console::init`]; every I/O call
/// dispatches to the backend chosen there.
#[derive(Debug)]
pub enum Console<R> {
    Qemu(Ns16550<R>),
    Potato(Potato<R>),
}

impl<R: RegisterFile> Console<R> {
    /// Select and configure a backend.
    ///
    /// With `use_emulated` the QEMU 16550 is used as-is. Otherwise the potato
    /// console is mapped and its clock divisor programmed. Only the chosen
    /// backend's registers are mapped or touched.
    pub fn init<A>(space: &mut A, use_emulated: bool) -> Self
    where
        A: AddressSpace<Regs = R>,
    {
        if use_emulated {
            debug!("console: qemu 16550 at {:#x}", QEMU_UART_BASE);
            Console::Qemu(Ns16550::new(space.map(QEMU_UART_BASE)))
        } else {
            debug!("console: potato at {:#x}", POTATO_UART_BASE);
            Console::Potato(Potato::init(
                space.map(POTATO_UART_BASE),
                PROC_FREQ,
                UART_FREQ,
            ))
        }
    }

    /// Initialize from the raw value the boot stub leaves in r3, which is
    /// non-zero when running under QEMU.
    pub fn from_boot_flag<A>(space: &mut A, r3: u64) -> Self
    where
        A: AddressSpace<Regs = R>,
    {
        Self::init(space, r3 != 0)
    }

    pub fn kind(&self) -> ConsoleKind {
        match self {
            Console::Qemu(_) => ConsoleKind::Qemu,
            Console::Potato(_) => ConsoleKind::Potato,
        }
    }

    pub fn into_inner(self) -> R {
        match self {
            Console::Qemu(uart) => uart.into_inner(),
            Console::Potato(uart) => uart.into_inner(),
        }
    }
}

impl<R: RegisterFile> UartBackend for Console<R> {
    fn tx_full(&mut self) -> bool {
        match self {
            Console::Qemu(uart) => uart.tx_full(),
            Console::Potato(uart) => uart.tx_full(),
        }
    }

    fn rx_empty(&mut self) -> bool {
        match self {
            Console::Qemu(uart) => uart.rx_empty(),
            Console::Potato(uart) => uart.rx_empty(),
        }
    }

    fn read(&mut self) -> u8 {
        match self {
            Console::Qemu(uart) => uart.read(),
            Console::Potato(uart) => uart.read(),
        }
    }

    fn write(&mut self, byte: u8) {
        match self {
            Console::Qemu(uart) => uart.write(byte),
            Console::Potato(uart) => uart.write(byte),
        }
    }
}

impl<R: RegisterFile> fmt::Write for Console<R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send(s.as_bytes());
        Ok(())
    }
}
