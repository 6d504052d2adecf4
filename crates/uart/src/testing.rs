//! Register doubles for unit tests.

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::regs::{AddressSpace, RegisterFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read8 { offset: u64 },
    Write8 { offset: u64, value: u8 },
    Read64 { offset: u64 },
    Write64 { offset: u64, value: u64 },
}

/// Plain storage per offset, with every access logged.
#[derive(Debug, Default)]
pub struct FakeRegs {
    pub base: u64,
    pub values: BTreeMap<u64, u64>,
    pub log: Vec<Access>,
}

impl FakeRegs {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    /// Preload a register without logging an access.
    pub fn set(&mut self, offset: u64, value: u64) {
        self.values.insert(offset, value);
    }

    pub fn writes(&self) -> Vec<Access> {
        self.log
            .iter()
            .copied()
            .filter(|a| matches!(a, Access::Write8 { .. } | Access::Write64 { .. }))
            .collect()
    }
}

impl RegisterFile for FakeRegs {
    fn read_u8(&mut self, offset: u64) -> u8 {
        self.log.push(Access::Read8 { offset });
        self.values.get(&offset).copied().unwrap_or(0) as u8
    }

    fn write_u8(&mut self, offset: u64, value: u8) {
        self.log.push(Access::Write8 { offset, value });
        self.values.insert(offset, value as u64);
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        self.log.push(Access::Read64 { offset });
        self.values.get(&offset).copied().unwrap_or(0)
    }

    fn write_u64(&mut self, offset: u64, value: u64) {
        self.log.push(Access::Write64 { offset, value });
        self.values.insert(offset, value);
    }
}

/// Records which bases were mapped and preloads the same registers in each.
#[derive(Debug, Default)]
pub struct FakeSpace {
    pub mapped: Vec<u64>,
    pub presets: Vec<(u64, u64)>,
}

impl AddressSpace for FakeSpace {
    type Regs = FakeRegs;

    fn map(&mut self, base: u64) -> FakeRegs {
        self.mapped.push(base);
        let mut regs = FakeRegs::new(base);
        for &(offset, value) in &self.presets {
            regs.set(offset, value);
        }
        regs
    }
}
