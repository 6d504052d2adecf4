#![no_main]
#![no_std]

use panic_halt as _;
use ppcboot_uart::{announce, Console, PhysicalMemory};

// r3 carries the boot loader's "running under QEMU" flag and is passed
// through untouched. Entering through ctr/r12 lets boot_main set up its TOC.
#[cfg(target_arch = "powerpc64")]
core::arch::global_asm!(
    ".section .text.start, \"ax\"",
    ".globl _start",
    "_start:",
    "    lis    1, __stack_top@highest",
    "    ori    1, 1, __stack_top@higher",
    "    rldicr 1, 1, 32, 31",
    "    oris   1, 1, __stack_top@h",
    "    ori    1, 1, __stack_top@l",
    "    li     0, 0",
    "    stdu   0, -32(1)",
    "    lis    12, boot_main@highest",
    "    ori    12, 12, boot_main@higher",
    "    rldicr 12, 12, 32, 31",
    "    oris   12, 12, boot_main@h",
    "    ori    12, 12, boot_main@l",
    "    mtctr  12",
    "    bctrl",
    "1:  b      1b",
);

#[no_mangle]
pub extern "C" fn boot_main(r3: u64) -> ! {
    // SAFETY: we are the only code running, before any MMU setup.
    let mut memory = unsafe { PhysicalMemory::new() };
    let mut console = Console::from_boot_flag(&mut memory, r3);

    announce(&mut console);

    halt()
}

fn halt() -> ! {
    loop {
        #[cfg(target_arch = "powerpc64")]
        unsafe {
            core::arch::asm!("wait 0", options(nomem, nostack));
        }
        #[cfg(not(target_arch = "powerpc64"))]
        core::hint::spin_loop();
    }
}
