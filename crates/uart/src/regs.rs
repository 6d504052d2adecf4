//! Register-file capability.
//!
//! Backends never dereference addresses themselves. They hold something that
//! implements [`RegisterFile`] and ask it for 8- or 64-bit accesses at a byte
//! offset. On hardware that is [`Mmio`]; on the host it is a window onto a
//! simulated bus.

/// Device registers addressed by byte offset from the start of the block.
///
/// Implementations must perform every access exactly once and in program
/// order: no caching, merging or elision.
pub trait RegisterFile {
    fn read_u8(&mut self, offset: u64) -> u8;
    fn write_u8(&mut self, offset: u64, value: u8);
    fn read_u64(&mut self, offset: u64) -> u64;
    fn write_u64(&mut self, offset: u64, value: u64);
}

/// Hands out register files for physical base addresses.
pub trait AddressSpace {
    type Regs: RegisterFile;

    fn map(&mut self, base: u64) -> Self::Regs;
}

/// Memory-mapped registers accessed with volatile loads and stores.
#[derive(Debug)]
pub struct Mmio {
    base: *mut u8,
}

impl Mmio {
    /// Wrap the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a device register block that is mapped
    /// (uncached) for as long as the returned value lives, and nothing else
    /// may access that block concurrently.
    pub const unsafe fn new(base: u64) -> Self {
        Self {
            base: base as usize as *mut u8,
        }
    }

    pub fn base(&self) -> u64 {
        self.base as usize as u64
    }
}

impl RegisterFile for Mmio {
    fn read_u8(&mut self, offset: u64) -> u8 {
        // SAFETY: `Mmio::new` requires the block to be mapped.
        unsafe { self.base.add(offset as usize).read_volatile() }
    }

    fn write_u8(&mut self, offset: u64, value: u8) {
        // SAFETY: `Mmio::new` requires the block to be mapped.
        unsafe { self.base.add(offset as usize).write_volatile(value) }
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        // SAFETY: `Mmio::new` requires the block to be mapped; 64-bit
        // registers sit at 8-byte aligned offsets.
        unsafe {
            self.base
                .add(offset as usize)
                .cast::<u64>()
                .read_volatile()
        }
    }

    fn write_u64(&mut self, offset: u64, value: u64) {
        // SAFETY: see `read_u64`.
        unsafe {
            self.base
                .add(offset as usize)
                .cast::<u64>()
                .write_volatile(value)
        }
    }
}

/// The machine's physical address space, identity mapped with caching
/// disabled for device ranges (true at reset on the boot CPU).
#[derive(Debug)]
pub struct PhysicalMemory {
    _private: (),
}

impl PhysicalMemory {
    /// # Safety
    ///
    /// Only valid before the MMU is turned on, and only one instance may
    /// exist at a time.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl AddressSpace for PhysicalMemory {
    type Regs = Mmio;

    fn map(&mut self, base: u64) -> Mmio {
        // SAFETY: holding a `PhysicalMemory` means real-mode identity mapping.
        unsafe { Mmio::new(base) }
    }
}
