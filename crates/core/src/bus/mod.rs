use std::cell::RefCell;
use std::rc::Rc;

use ppcboot_uart::{AddressSpace, RegisterFile};
use serde::Serialize;

use crate::{AccessWidth, Peripheral, SimResult, SimulationError};

pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub dev: Box<dyn Peripheral>,
}

impl PeripheralEntry {
    fn contains(&self, addr: u64, width: AccessWidth) -> bool {
        addr.checked_sub(self.base)
            .and_then(|offset| offset.checked_add(width.bytes()))
            .is_some_and(|end| end <= self.size)
    }
}

/// Device errors carry offsets; report them at the bus address.
fn rebase(err: SimulationError, base: u64) -> SimulationError {
    match err {
        SimulationError::BusFault(offset) => SimulationError::BusFault(base.wrapping_add(offset)),
        SimulationError::UnsupportedAccess { addr, width } => SimulationError::UnsupportedAccess {
            addr: base.wrapping_add(addr),
            width,
        },
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

/// One completed bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusAccess {
    pub kind: AccessKind,
    pub addr: u64,
    pub width: AccessWidth,
    pub value: u64,
}

/// Address decoder in front of the simulated peripherals.
///
/// Every access that reaches a device is appended to `log`, in order.
/// Accesses that fail are kept in `faults` instead.
#[derive(Default)]
pub struct SystemBus {
    pub peripherals: Vec<PeripheralEntry>,
    pub log: Vec<BusAccess>,
    pub faults: Vec<SimulationError>,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peripheral(&mut self, name: &str, base: u64, size: u64, dev: Box<dyn Peripheral>) {
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base,
            size,
            dev,
        });
    }

    fn entry_mut(&mut self, addr: u64, width: AccessWidth) -> SimResult<&mut PeripheralEntry> {
        self.peripherals
            .iter_mut()
            .find(|p| p.contains(addr, width))
            .ok_or(SimulationError::BusFault(addr))
    }

    pub fn read(&mut self, addr: u64, width: AccessWidth) -> SimResult<u64> {
        let entry = self.entry_mut(addr, width)?;
        let base = entry.base;
        let value = entry
            .dev
            .read(addr - base, width)
            .map_err(|e| rebase(e, base))?;
        self.log.push(BusAccess {
            kind: AccessKind::Read,
            addr,
            width,
            value,
        });
        Ok(value)
    }

    pub fn write(&mut self, addr: u64, width: AccessWidth, value: u64) -> SimResult<()> {
        let entry = self.entry_mut(addr, width)?;
        let base = entry.base;
        entry
            .dev
            .write(addr - base, width, value)
            .map_err(|e| rebase(e, base))?;
        self.log.push(BusAccess {
            kind: AccessKind::Write,
            addr,
            width,
            value,
        });
        Ok(())
    }

    /// Look up a peripheral by name and downcast it.
    pub fn peripheral<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any())
            .and_then(|any| any.downcast_ref::<T>())
    }

    /// Logged accesses that fall inside `[base, base + size)`.
    pub fn accesses_in(&self, base: u64, size: u64) -> impl Iterator<Item = &BusAccess> + '_ {
        self.log
            .iter()
            .filter(move |a| a.addr >= base && a.addr - base < size)
    }

    pub fn count(&self, kind: AccessKind, addr: u64) -> usize {
        self.log
            .iter()
            .filter(|a| a.kind == kind && a.addr == addr)
            .count()
    }

    fn record_fault(&mut self, err: SimulationError) {
        tracing::warn!("{}", err);
        self.faults.push(err);
    }
}

/// A [`SystemBus`] shared between the HAL's register windows and the
/// code that inspects it afterwards.
#[derive(Clone, Default)]
pub struct SharedBus(Rc<RefCell<SystemBus>>);

impl SharedBus {
    pub fn new(bus: SystemBus) -> Self {
        Self(Rc::new(RefCell::new(bus)))
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, SystemBus> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, SystemBus> {
        self.0.borrow_mut()
    }
}

impl AddressSpace for SharedBus {
    type Regs = BusWindow;

    fn map(&mut self, base: u64) -> BusWindow {
        tracing::debug!("Mapping register window at {:#x}", base);
        BusWindow {
            bus: self.clone(),
            base,
        }
    }
}

/// Register file backed by the simulated bus.
///
/// Hardware accesses cannot fail, so a fault is recorded on the bus and the
/// read returns zero.
#[derive(Clone)]
pub struct BusWindow {
    bus: SharedBus,
    base: u64,
}

impl BusWindow {
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Absolute address of `offset`. A window that runs off the end of the
    /// address space faults at its base.
    fn addr(&self, offset: u64) -> SimResult<u64> {
        self.base
            .checked_add(offset)
            .ok_or(SimulationError::BusFault(self.base))
    }

    fn load(&mut self, offset: u64, width: AccessWidth) -> u64 {
        let mut bus = self.bus.borrow_mut();
        match self.addr(offset).and_then(|addr| bus.read(addr, width)) {
            Ok(value) => value,
            Err(e) => {
                bus.record_fault(e);
                0
            }
        }
    }

    fn store(&mut self, offset: u64, width: AccessWidth, value: u64) {
        let mut bus = self.bus.borrow_mut();
        if let Err(e) = self.addr(offset).and_then(|addr| bus.write(addr, width, value)) {
            bus.record_fault(e);
        }
    }
}

impl RegisterFile for BusWindow {
    fn read_u8(&mut self, offset: u64) -> u8 {
        self.load(offset, AccessWidth::Byte) as u8
    }

    fn write_u8(&mut self, offset: u64, value: u8) {
        self.store(offset, AccessWidth::Byte, u64::from(value));
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        self.load(offset, AccessWidth::DoubleWord)
    }

    fn write_u64(&mut self, offset: u64, value: u64) {
        self.store(offset, AccessWidth::DoubleWord, value);
    }
}
