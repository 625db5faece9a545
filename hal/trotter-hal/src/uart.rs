//! UART serial link abstractions
//!
//! The servo bus is a single half-duplex wire shared by every actuator.
//! Only one request may be in flight, so the traits are blocking: a write
//! returns once the bytes are on the wire and a read returns once the
//! buffer is full or the link's response window has passed.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Fills `buf` completely or fails. Implementations return an error when
    /// no byte arrives within the configured response window; that is how
    /// an unpowered or unplugged actuator shows up.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Drop any bytes already sitting in the receive buffer
    ///
    /// Called before each request so a late reply to a previous request
    /// cannot be taken for the answer to the next one.
    fn discard_pending(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Combined half-duplex servo link
///
/// For UARTs that provide both TX and RX on a single peripheral with a
/// shared error type.
pub trait ServoLink: UartTx + UartRx<Error = <Self as UartTx>::Error> {}

// Blanket implementation
impl<T> ServoLink for T where T: UartTx + UartRx<Error = <T as UartTx>::Error> {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// How long a read waits for the first byte of a reply (ms)
    pub response_timeout_ms: u32,
}

impl Default for UartConfig {
    /// LX-16A bus defaults: 115200 8N1 with a 100 ms response window
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            response_timeout_ms: 100,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback {
        pending: [u8; 4],
        len: usize,
    }

    impl UartTx for Loopback {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            let n = data.len().min(self.pending.len());
            self.pending[..n].copy_from_slice(&data[..n]);
            self.len = n;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for Loopback {
        type Error = ();

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            if buf.len() > self.len {
                return Err(());
            }
            buf.copy_from_slice(&self.pending[..buf.len()]);
            self.pending.copy_within(buf.len()..self.len, 0);
            self.len -= buf.len();
            Ok(buf.len())
        }
    }

    fn assert_link<L: ServoLink>(_: &L) {}

    #[test]
    fn test_default_config_matches_servo_bus() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.response_timeout_ms, 100);
    }

    #[test]
    fn test_short_read_fails() {
        let mut link = Loopback {
            pending: [0; 4],
            len: 0,
        };
        assert_link(&link);

        link.write_blocking(&[0x55, 0x55, 0x01]).unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(link.read_blocking(&mut buf), Ok(2));
        assert_eq!(buf, [0x55, 0x55]);
        assert_eq!(link.read_blocking(&mut buf), Err(()));
    }

    #[test]
    fn test_discard_pending_defaults_to_noop() {
        let mut link = Loopback {
            pending: [0; 4],
            len: 0,
        };
        assert_eq!(link.discard_pending(), Ok(()));
    }
}
