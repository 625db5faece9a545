//! Trotter - Quadruped Leg Rig Firmware
//!
//! Main firmware binary for an RP2040 board driving eight LX-16A servos on
//! a single half-duplex UART bus. Boot diagnostics gate every motion stage;
//! the rig then homes, trots for one window and returns to rest.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use trotter_core::config::RigConfig;
use trotter_drivers::{Lx16aBus, Lx16aConfig};

use crate::bus::{peripheral_config, ServoUart};

mod bus;
mod config;
mod report;
mod tasks;
mod timing;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Rig tables are read by the rig task for the program duration
static RIG_CONFIG: StaticCell<RigConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Trotter firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // build.rs already checked rig.toml; this guards hand edits of the table
    let rig_config = RIG_CONFIG.init(config::RIG);
    if let Err(e) = rig_config.validate() {
        defmt::panic!("Rig configuration invalid: {}", Display2Format(&e));
    }

    // Servo bus on UART0 (GPIO0 TX, GPIO1 RX)
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let bus_config = config::BUS;
    let uart_config = peripheral_config(&bus_config.uart);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    let link = ServoUart::new(tx, rx, &bus_config.uart);
    let bus = Lx16aBus::new(
        link,
        Lx16aConfig {
            echo: bus_config.echo,
        },
    );

    info!(
        "Servo bus initialized: {}, echo={}",
        bus_config.uart, bus_config.echo
    );

    unwrap!(spawner.spawn(tasks::rig_task(bus, rig_config)));

    info!("Rig task spawned");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
