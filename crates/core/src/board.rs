use ppcboot_config::{BoardManifest, StopReason};
use ppcboot_uart::console::ConsoleKind;
use ppcboot_uart::{ns16550, potato, Bounded, Console, UartBackend};

use crate::bus::{SharedBus, SystemBus};
use crate::peripherals::ns16550::Ns16550;
use crate::peripherals::potato::PotatoConsole;
use crate::peripherals::SerialDevice;
use crate::report::BootReport;
use crate::SimResult;

pub const POTATO_NAME: &str = "potato";
pub const QEMU_NAME: &str = "qemu-uart";

/// How a simulated boot is driven.
#[derive(Debug, Clone, Copy)]
pub struct BootOptions {
    /// Boot flag passed in r3.
    pub emulated: bool,
    /// Status polls allowed per wait before the run is stopped.
    pub max_polls: u32,
    /// Bytes to receive and echo back after the banner.
    pub echo: u32,
}

/// Both console devices on one bus at their hardware addresses.
pub struct Board {
    name: String,
    bus: SharedBus,
}

impl Board {
    pub fn new(manifest: &BoardManifest) -> Self {
        let mut bus = SystemBus::new();
        bus.add_peripheral(
            POTATO_NAME,
            potato::POTATO_UART_BASE,
            potato::REGISTER_SPAN,
            Box::new(PotatoConsole::new(&manifest.potato)),
        );
        bus.add_peripheral(
            QEMU_NAME,
            ns16550::QEMU_UART_BASE,
            ns16550::REGISTER_SPAN,
            Box::new(Ns16550::new(&manifest.qemu)),
        );
        Self {
            name: manifest.name.clone(),
            bus: SharedBus::new(bus),
        }
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    /// Run the firmware's boot path: bring up the console, print the banner,
    /// optionally echo input, halt.
    pub fn boot(&mut self, options: &BootOptions) -> BootReport {
        tracing::info!(
            "Booting {} ({})",
            self.name,
            if options.emulated { "qemu" } else { "hardware" }
        );

        let mut console = Console::init(&mut self.bus, options.emulated);
        let mut poll = Bounded::new(options.max_polls);
        let outcome = run_firmware(&mut console, &mut poll, options.echo);

        let stop_reason = match &outcome {
            Ok(()) => StopReason::Halt,
            Err(e) => {
                tracing::warn!("Boot stopped: {}", e);
                StopReason::PollTimeout
            }
        };

        self.report(console.kind(), stop_reason, poll.polls())
    }

    fn report(&self, kind: ConsoleKind, stop_reason: StopReason, status_polls: u64) -> BootReport {
        let bus = self.bus.borrow();
        let (console, line) = match kind {
            ConsoleKind::Qemu => ("qemu", bus.peripheral::<Ns16550>(QEMU_NAME).map(|d| d.line())),
            ConsoleKind::Potato => (
                "potato",
                bus.peripheral::<PotatoConsole>(POTATO_NAME).map(|d| d.line()),
            ),
        };
        let clock_divisor = bus
            .peripheral::<PotatoConsole>(POTATO_NAME)
            .filter(|d| d.clock_programmed())
            .map(PotatoConsole::clock_divisor);

        let stop_reason = if bus.faults.is_empty() {
            stop_reason
        } else {
            StopReason::BusFault
        };

        BootReport {
            board: self.name.clone(),
            console: console.to_string(),
            stop_reason,
            transcript: line.map(|l| l.transcript().to_vec()).unwrap_or_default(),
            clock_divisor,
            status_polls,
            bus_accesses: bus.log.len(),
            faults: bus.faults.iter().map(ToString::to_string).collect(),
        }
    }
}

fn run_firmware<U: UartBackend>(console: &mut U, poll: &mut Bounded, echo: u32) -> SimResult<()> {
    ppcboot_uart::announce_with(console, poll)?;
    for _ in 0..echo {
        let byte = console.receive_with(poll)?;
        console.send_with(&[byte], poll)?;
    }
    tracing::debug!("Firmware reached halt");
    Ok(())
}
