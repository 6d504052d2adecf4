#[cfg(test)]
mod tests {
    use ppcboot_config::{BoardManifest, SerialLineConfig, StopReason};
    use ppcboot_uart::console::ConsoleKind;
    use ppcboot_uart::ns16550::{self, QEMU_UART_BASE};
    use ppcboot_uart::potato::{self, POTATO_UART_BASE};
    use ppcboot_uart::{AddressSpace, Console, RegisterFile, UartBackend, BANNER};

    use crate::board::{Board, BootOptions, POTATO_NAME, QEMU_NAME};
    use crate::bus::{AccessKind, BusAccess, SharedBus};
    use crate::peripherals::ns16550::Ns16550;
    use crate::peripherals::potato::PotatoConsole;
    use crate::peripherals::SerialDevice;
    use crate::{AccessWidth, SimulationError};

    const EXPECTED: &[u8] = b"PowerPC to the People\r\n";

    fn options(emulated: bool) -> BootOptions {
        BootOptions {
            emulated,
            max_polls: 100,
            echo: 0,
        }
    }

    fn potato_tx(board: &Board) -> Vec<u8> {
        let bus = board.bus().borrow();
        bus.peripheral::<PotatoConsole>(POTATO_NAME)
            .unwrap()
            .line()
            .transcript()
            .to_vec()
    }

    fn qemu_tx(board: &Board) -> Vec<u8> {
        let bus = board.bus().borrow();
        bus.peripheral::<Ns16550>(QEMU_NAME)
            .unwrap()
            .line()
            .transcript()
            .to_vec()
    }

    #[test]
    fn test_hardware_boot_prints_banner() {
        let mut board = Board::new(&BoardManifest::default());
        let report = board.boot(&options(false));

        assert_eq!(report.stop_reason, StopReason::Halt);
        assert_eq!(report.console, "potato");
        assert_eq!(report.transcript, EXPECTED);
        assert_eq!(EXPECTED.len(), BANNER.len() + 2);
        assert_eq!(report.clock_divisor, Some(26));
        assert_eq!(potato_tx(&board), EXPECTED);

        let bus = board.bus().borrow();
        assert_eq!(
            bus.log.first(),
            Some(&BusAccess {
                kind: AccessKind::Write,
                addr: POTATO_UART_BASE + potato::reg::CLOCK_DIV,
                width: AccessWidth::DoubleWord,
                value: 26,
            })
        );
        assert_eq!(bus.accesses_in(QEMU_UART_BASE, ns16550::REGISTER_SPAN).count(), 0);
        assert!(bus.faults.is_empty());
    }

    #[test]
    fn test_emulated_boot_touches_only_qemu() {
        let mut board = Board::new(&BoardManifest::default());
        let report = board.boot(&options(true));

        assert_eq!(report.stop_reason, StopReason::Halt);
        assert_eq!(report.console, "qemu");
        assert_eq!(report.transcript, EXPECTED);
        assert_eq!(report.clock_divisor, None);
        assert_eq!(qemu_tx(&board), EXPECTED);
        assert!(potato_tx(&board).is_empty());

        let bus = board.bus().borrow();
        assert_eq!(bus.accesses_in(POTATO_UART_BASE, potato::REGISTER_SPAN).count(), 0);
        assert!(bus
            .log
            .iter()
            .all(|a| a.width == AccessWidth::Byte && a.addr >= QEMU_UART_BASE));
    }

    #[test]
    fn test_send_never_full_writes_exact_bytes() {
        let payloads: [&[u8]; 4] = [b"", b"\0", b"PowerPC", &[0xff, 0x00, 0x0d, 0x0a, 0x80]];
        for emulated in [false, true] {
            for payload in payloads {
                let board = Board::new(&BoardManifest::default());
                let mut bus = board.bus().clone();
                let mut console = Console::init(&mut bus, emulated);
                console.send(payload);
                drop(console);

                let tx = if emulated { qemu_tx(&board) } else { potato_tx(&board) };
                assert_eq!(tx, payload, "emulated={emulated}");
                // nothing written to the idle console either
                let idle = if emulated { potato_tx(&board) } else { qemu_tx(&board) };
                assert!(idle.is_empty());
            }
        }
    }

    #[test]
    fn test_receive_waits_exactly_n_plus_one_polls() {
        const N: u32 = 5;
        let manifest = BoardManifest {
            potato: SerialLineConfig {
                rx_input: "A".to_string(),
                rx_delay_polls: N,
                ..Default::default()
            },
            ..Default::default()
        };
        let board = Board::new(&manifest);
        let mut bus = board.bus().clone();
        let mut console = Console::init(&mut bus, false);

        assert_eq!(console.receive(), 0x41);

        let bus = board.bus().borrow();
        let status = POTATO_UART_BASE + potato::reg::STATUS;
        assert_eq!(bus.count(AccessKind::Read, status), (N + 1) as usize);
        assert_eq!(
            bus.count(AccessKind::Read, POTATO_UART_BASE + potato::reg::RX),
            1
        );
    }

    #[test]
    fn test_qemu_receive_waits_on_data_ready() {
        const N: u32 = 3;
        let manifest = BoardManifest {
            qemu: SerialLineConfig {
                rx_input: "A".to_string(),
                rx_delay_polls: N,
                ..Default::default()
            },
            ..Default::default()
        };
        let board = Board::new(&manifest);
        let mut bus = board.bus().clone();
        let mut console = Console::init(&mut bus, true);
        assert_eq!(console.kind(), ConsoleKind::Qemu);

        assert_eq!(console.receive(), b'A');

        let bus = board.bus().borrow();
        let lsr = QEMU_UART_BASE + ns16550::reg::LSR;
        assert_eq!(bus.count(AccessKind::Read, lsr), (N + 1) as usize);
    }

    #[test]
    fn test_stalled_transmitter_polls_per_byte() {
        let manifest = BoardManifest {
            potato: SerialLineConfig {
                tx_stall_polls: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let board = Board::new(&manifest);
        let mut bus = board.bus().clone();
        let mut console = Console::init(&mut bus, false);
        console.send(b"abc");

        let bus = board.bus().borrow();
        let status = POTATO_UART_BASE + potato::reg::STATUS;
        assert_eq!(bus.count(AccessKind::Read, status), 9);
    }

    #[test]
    fn test_stuck_transmitter_stops_with_poll_timeout() {
        let manifest = BoardManifest {
            potato: SerialLineConfig {
                tx_stall_polls: u32::MAX,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut board = Board::new(&manifest);
        let report = board.boot(&BootOptions {
            emulated: false,
            max_polls: 10,
            echo: 0,
        });

        assert_eq!(report.stop_reason, StopReason::PollTimeout);
        assert!(report.transcript.is_empty());
        assert_eq!(report.status_polls, 10);
        assert_eq!(report.clock_divisor, Some(26));
    }

    #[test]
    fn test_echo_returns_input() {
        let manifest = BoardManifest {
            qemu: SerialLineConfig {
                rx_input: "hi".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut board = Board::new(&manifest);
        let report = board.boot(&BootOptions {
            emulated: true,
            max_polls: 100,
            echo: 2,
        });

        assert_eq!(report.stop_reason, StopReason::Halt);
        assert_eq!(report.transcript_text(), "PowerPC to the People\r\nhi");
    }

    #[test]
    fn test_echo_without_input_times_out() {
        let mut board = Board::new(&BoardManifest::default());
        let report = board.boot(&BootOptions {
            emulated: false,
            max_polls: 50,
            echo: 1,
        });
        assert_eq!(report.stop_reason, StopReason::PollTimeout);
        assert_eq!(report.transcript, EXPECTED);
    }

    #[test]
    fn test_unmapped_window_records_fault() {
        let mut bus = SharedBus::default();
        let mut regs = bus.map(0x1000);
        assert_eq!(regs.read_u8(0), 0);
        regs.write_u64(8, 1);

        let bus = bus.borrow();
        assert!(bus.log.is_empty());
        assert_eq!(
            bus.faults,
            vec![
                SimulationError::BusFault(0x1000),
                SimulationError::BusFault(0x1008)
            ]
        );
    }

    #[test]
    fn test_wrong_width_reported_as_bus_fault_stop() {
        let mut board = Board::new(&BoardManifest::default());
        {
            let mut bus = board.bus().clone();
            let mut regs = bus.map(POTATO_UART_BASE);
            regs.write_u8(potato::reg::TX, b'x');
        }
        let report = board.boot(&options(false));
        assert_eq!(report.stop_reason, StopReason::BusFault);
        assert_eq!(
            report.faults,
            vec![format!("Unsupported Byte access at {:#x}", POTATO_UART_BASE)]
        );
    }

    #[test]
    fn test_wrong_width_faults_at_bus_address() {
        let board = Board::new(&BoardManifest::default());
        let mut bus = board.bus().clone();
        bus.map(POTATO_UART_BASE).write_u8(potato::reg::STATUS, 1);
        bus.map(QEMU_UART_BASE).read_u64(ns16550::reg::LSR);

        let bus = bus.borrow();
        assert_eq!(
            bus.faults,
            vec![
                SimulationError::UnsupportedAccess {
                    addr: 0xc000_2010,
                    width: AccessWidth::Byte
                },
                SimulationError::UnsupportedAccess {
                    addr: QEMU_UART_BASE + 5,
                    width: AccessWidth::DoubleWord
                },
            ]
        );
        assert_eq!(
            bus.faults[0].to_string(),
            "Unsupported Byte access at 0xc0002010"
        );
    }

    #[test]
    fn test_window_at_top_of_address_space_faults() {
        let mut bus = SharedBus::default();
        assert_eq!(bus.map(u64::MAX - 3).read_u64(0), 0);
        bus.map(u64::MAX).write_u8(1, 0x41);

        let faults = bus.borrow().faults.clone();
        assert_eq!(
            faults,
            vec![
                SimulationError::BusFault(u64::MAX - 3),
                SimulationError::BusFault(u64::MAX)
            ]
        );
    }

    #[test]
    fn test_device_at_top_of_address_space() {
        let top = u64::MAX - 7;
        let mut bus = SharedBus::default();
        bus.borrow_mut().add_peripheral(
            POTATO_NAME,
            top,
            8,
            Box::new(PotatoConsole::new(&SerialLineConfig::default())),
        );

        let mut regs = bus.map(top);
        regs.write_u64(potato::reg::TX, b'!' as u64);
        // straddles the end of the device and of the address space
        regs.write_u64(4, 0);

        let bus = bus.borrow();
        assert_eq!(bus.log.len(), 1);
        assert_eq!(bus.accesses_in(top, 8).count(), 1);
        assert_eq!(bus.faults, vec![SimulationError::BusFault(top + 4)]);
        let dev = bus.peripheral::<PotatoConsole>(POTATO_NAME).unwrap();
        assert_eq!(dev.line().transcript(), b"!");
    }

    #[test]
    fn test_boot_never_enables_interrupts() {
        let mut board = Board::new(&BoardManifest::default());
        board.boot(&options(false));
        board.boot(&options(true));

        let bus = board.bus().borrow();
        let dev = bus.peripheral::<PotatoConsole>(POTATO_NAME).unwrap();
        assert_eq!(dev.irq_enable(), 0);
        assert_eq!(
            bus.count(AccessKind::Write, POTATO_UART_BASE + potato::reg::IRQ_EN),
            0
        );
        assert_eq!(
            bus.count(AccessKind::Write, QEMU_UART_BASE + ns16550::reg::IER),
            0
        );
    }
}
