//! Servo UART link
//!
//! Adapts the buffered RP2040 UART to the blocking link traits the LX-16A
//! driver is written against. Reads give up once the response window has
//! passed, which is how an absent servo shows up.

use defmt::*;
use embassy_rp::uart::{self as rp_uart, BufferedUartRx, BufferedUartTx, Error as UartError};
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};

use trotter_hal::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};

/// Peripheral settings for a servo bus frame format
pub fn peripheral_config(config: &UartConfig) -> rp_uart::Config {
    let mut cfg = rp_uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => rp_uart::DataBits::DataBits7,
        DataBits::Eight => rp_uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => rp_uart::Parity::ParityNone,
        Parity::Even => rp_uart::Parity::ParityEven,
        Parity::Odd => rp_uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => rp_uart::StopBits::STOP1,
        StopBits::Two => rp_uart::StopBits::STOP2,
    };
    cfg
}

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum LinkError {
    /// UART reported a framing, parity, break or overrun error
    Uart(UartError),
    /// Reply did not arrive within the response window
    Timeout,
}

impl From<UartError> for LinkError {
    fn from(e: UartError) -> Self {
        LinkError::Uart(e)
    }
}

/// Half-duplex servo bus on a buffered UART
pub struct ServoUart {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
    response_timeout: Duration,
}

impl ServoUart {
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx, config: &UartConfig) -> Self {
        Self {
            tx,
            rx,
            response_timeout: Duration::from_millis(config.response_timeout_ms.into()),
        }
    }
}

impl UartTx for ServoUart {
    type Error = LinkError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.tx.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        Write::flush(&mut self.tx)?;
        Ok(())
    }
}

impl UartRx for ServoUart {
    type Error = LinkError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let deadline = Instant::now() + self.response_timeout;
        let mut filled = 0;

        while filled < buf.len() {
            if self.rx.read_ready()? {
                filled += self.rx.read(&mut buf[filled..])?;
            } else if Instant::now() >= deadline {
                return Err(LinkError::Timeout);
            }
        }

        Ok(filled)
    }

    fn discard_pending(&mut self) -> Result<(), LinkError> {
        let mut scratch = [0u8; 16];
        let mut dropped = 0usize;
        while self.rx.read_ready()? {
            dropped += self.rx.read(&mut scratch)?;
        }
        if dropped > 0 {
            trace!("Dropped {} stale bytes", dropped);
        }
        Ok(())
    }
}
