//! LX-16A serial bus servo driver
//!
//! Every servo on the bus shares one half-duplex UART at 115200 baud (8N1)
//! and is addressed by ID.
//!
//! # Packet format
//!
//! ```text
//! 0x55 0x55 | id | len | cmd | params... | checksum
//! ```
//!
//! - `len` counts itself, `cmd`, the params and the checksum (`params + 3`)
//! - `checksum = !(id + len + cmd + sum(params))`, truncated to a byte
//! - multi-byte values are little-endian
//!
//! Writes are unacknowledged. Reads are answered with a packet in the same
//! format, carrying the same ID and command.
//!
//! Positions are 0-1000 units over 0-240 degrees (0.24 degree per unit).

use heapless::Vec;
use trotter_core::traits::{BusError, ErrorTriggers, ServoBus, ServoMode};
use trotter_hal::uart::{ServoLink, UartRx, UartTx};

/// Command codes
pub mod cmd {
    /// Move to a position over a duration
    pub const MOVE_TIME_WRITE: u8 = 1;
    /// Read the servo's ID
    pub const ID_READ: u8 = 14;
    /// Set position limits
    pub const ANGLE_LIMIT_WRITE: u8 = 20;
    /// Set supply voltage limits (mV)
    pub const VIN_LIMIT_WRITE: u8 = 22;
    /// Set over-temperature limit (°C)
    pub const TEMP_MAX_LIMIT_WRITE: u8 = 24;
    /// Read the sensed position
    pub const POS_READ: u8 = 28;
    /// Select servo or motor mode
    pub const OR_MOTOR_MODE_WRITE: u8 = 29;
    /// Load or unload the motor
    pub const LOAD_OR_UNLOAD_WRITE: u8 = 31;
    /// Switch the LED (0 = on, 1 = off)
    pub const LED_CTRL_WRITE: u8 = 33;
    /// Set LED error triggers
    pub const LED_ERROR_WRITE: u8 = 35;
    /// Read LED error triggers
    pub const LED_ERROR_READ: u8 = 36;
}

/// Packet header
pub const HEADER: [u8; 2] = [0x55, 0x55];

/// Largest parameter block any command used here carries
pub const MAX_PARAMS: usize = 4;

/// Header, id, len, cmd, params, checksum
pub const MAX_PACKET_LEN: usize = MAX_PARAMS + 6;

/// Highest position unit (240 degrees)
pub const MAX_POSITION: u16 = 1000;

/// Full travel (degrees)
const RANGE_DEG: f32 = 240.0;

/// Longest move duration the servo accepts (ms)
pub const MAX_MOVE_MS: u16 = 30000;

/// One encoded packet
pub type Packet = Vec<u8, MAX_PACKET_LEN>;

/// Protocol errors in a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lx16aError {
    /// Reply did not start with 0x55 0x55
    InvalidHeader,
    /// Reply came from a different ID
    WrongId,
    /// Reply answered a different command
    WrongCommand,
    /// Reply length field did not match the command
    WrongLength,
    /// Checksum mismatch
    ChecksumMismatch,
}

impl From<Lx16aError> for BusError {
    fn from(err: Lx16aError) -> Self {
        match err {
            Lx16aError::ChecksumMismatch => BusError::Checksum,
            Lx16aError::InvalidHeader
            | Lx16aError::WrongId
            | Lx16aError::WrongCommand
            | Lx16aError::WrongLength => BusError::Garbled,
        }
    }
}

/// Packet checksum over `id`, `len`, `cmd` and the params
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    !sum
}

/// Encode a command packet
///
/// Parameters beyond [`MAX_PARAMS`] are dropped.
pub fn build_packet(id: u8, command: u8, params: &[u8]) -> Packet {
    let params = &params[..params.len().min(MAX_PARAMS)];
    let len = params.len() as u8 + 3;

    let mut packet = Packet::new();
    let _ = packet.extend_from_slice(&HEADER);
    let _ = packet.extend_from_slice(&[id, len, command]);
    let _ = packet.extend_from_slice(params);
    let chk = checksum(&packet[2..]);
    let _ = packet.push(chk);
    packet
}

/// Validate a reply and return its params
pub fn parse_response(frame: &[u8], id: u8, command: u8) -> Result<&[u8], Lx16aError> {
    if frame.len() < 6 || frame[..2] != HEADER {
        return Err(Lx16aError::InvalidHeader);
    }
    if frame[2] != id {
        return Err(Lx16aError::WrongId);
    }
    if frame[3] as usize != frame.len() - 3 {
        return Err(Lx16aError::WrongLength);
    }
    if frame[4] != command {
        return Err(Lx16aError::WrongCommand);
    }
    let last = frame.len() - 1;
    if frame[last] != checksum(&frame[2..last]) {
        return Err(Lx16aError::ChecksumMismatch);
    }
    Ok(&frame[5..last])
}

/// Degrees to position units, rounded and clamped to 0-1000
pub fn degrees_to_position(deg: f32) -> u16 {
    let units = deg * MAX_POSITION as f32 / RANGE_DEG + 0.5;
    // `as` saturates, and maps NaN to 0
    (units as u16).min(MAX_POSITION)
}

/// Position units to degrees
///
/// The servo reports slightly negative positions near the end stop.
pub fn position_to_degrees(position: i16) -> f32 {
    position as f32 * RANGE_DEG / MAX_POSITION as f32
}

/// Driver options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lx16aConfig {
    /// The link hears its own transmissions (single-wire half-duplex
    /// without a direction switch); drop the echo after every write
    pub echo: bool,
}

/// LX-16A bus over a UART link
pub struct Lx16aBus<L> {
    link: L,
    config: Lx16aConfig,
}

impl<L: ServoLink> Lx16aBus<L> {
    pub fn new(link: L, config: Lx16aConfig) -> Self {
        Self { link, config }
    }

    pub fn config(&self) -> &Lx16aConfig {
        &self.config
    }

    /// Give the link back
    pub fn release(self) -> L {
        self.link
    }

    fn send(&mut self, id: u8, command: u8, params: &[u8]) -> Result<(), BusError> {
        let packet = build_packet(id, command, params);

        UartRx::discard_pending(&mut self.link).map_err(|_| BusError::Write)?;
        self.link
            .write_blocking(&packet)
            .map_err(|_| BusError::Write)?;
        UartTx::flush(&mut self.link).map_err(|_| BusError::Write)?;

        if self.config.echo {
            let mut echo = [0u8; MAX_PACKET_LEN];
            self.link
                .read_blocking(&mut echo[..packet.len()])
                .map_err(|_| BusError::Write)?;
        }
        Ok(())
    }

    /// Send a read request and return the `N` reply params
    fn query<const N: usize>(&mut self, id: u8, command: u8) -> Result<[u8; N], BusError> {
        self.send(id, command, &[])?;

        let mut frame = [0u8; MAX_PACKET_LEN];
        let frame_len = N + 6;
        let frame = frame
            .get_mut(..frame_len)
            .ok_or(BusError::Garbled)?;

        // The header tells whether anything answered at all
        self.link
            .read_blocking(&mut frame[..5])
            .map_err(|_| BusError::NoResponse)?;
        if frame[..2] != HEADER || frame[3] as usize != N + 3 {
            let _ = UartRx::discard_pending(&mut self.link);
            return Err(BusError::Garbled);
        }
        self.link
            .read_blocking(&mut frame[5..])
            .map_err(|_| BusError::Garbled)?;

        let params = parse_response(frame, id, command)?;
        let mut out = [0u8; N];
        out.copy_from_slice(params);
        Ok(out)
    }
}

impl<L: ServoLink> ServoBus for Lx16aBus<L> {
    fn set_vin_limits(&mut self, id: u8, min_mv: u16, max_mv: u16) -> Result<(), BusError> {
        let [min_lo, min_hi] = min_mv.to_le_bytes();
        let [max_lo, max_hi] = max_mv.to_le_bytes();
        self.send(id, cmd::VIN_LIMIT_WRITE, &[min_lo, min_hi, max_lo, max_hi])
    }

    fn set_temp_limit(&mut self, id: u8, max_c: u8) -> Result<(), BusError> {
        self.send(id, cmd::TEMP_MAX_LIMIT_WRITE, &[max_c])
    }

    fn set_mode(&mut self, id: u8, mode: ServoMode) -> Result<(), BusError> {
        let mode = match mode {
            ServoMode::Servo => 0,
            ServoMode::Motor => 1,
        };
        // Motor speed is left at zero; continuous rotation is never driven
        self.send(id, cmd::OR_MOTOR_MODE_WRITE, &[mode, 0, 0, 0])
    }

    fn set_torque(&mut self, id: u8, enabled: bool) -> Result<(), BusError> {
        self.send(id, cmd::LOAD_OR_UNLOAD_WRITE, &[enabled as u8])
    }

    fn set_led_power(&mut self, id: u8, on: bool) -> Result<(), BusError> {
        // Inverted on the wire
        self.send(id, cmd::LED_CTRL_WRITE, &[!on as u8])
    }

    fn set_led_error_triggers(&mut self, id: u8, triggers: ErrorTriggers) -> Result<(), BusError> {
        self.send(id, cmd::LED_ERROR_WRITE, &[triggers.to_bits()])
    }

    fn set_angle_limits(&mut self, id: u8, min_deg: f32, max_deg: f32) -> Result<(), BusError> {
        let [min_lo, min_hi] = degrees_to_position(min_deg).to_le_bytes();
        let [max_lo, max_hi] = degrees_to_position(max_deg).to_le_bytes();
        self.send(id, cmd::ANGLE_LIMIT_WRITE, &[min_lo, min_hi, max_lo, max_hi])
    }

    fn move_to(&mut self, id: u8, angle_deg: f32, duration_ms: u16) -> Result<(), BusError> {
        let [pos_lo, pos_hi] = degrees_to_position(angle_deg).to_le_bytes();
        let [t_lo, t_hi] = duration_ms.min(MAX_MOVE_MS).to_le_bytes();
        self.send(id, cmd::MOVE_TIME_WRITE, &[pos_lo, pos_hi, t_lo, t_hi])
    }

    fn read_physical_angle(&mut self, id: u8) -> Result<f32, BusError> {
        let raw = self.query::<2>(id, cmd::POS_READ)?;
        Ok(position_to_degrees(i16::from_le_bytes(raw)))
    }

    fn read_led_error_triggers(&mut self, id: u8) -> Result<ErrorTriggers, BusError> {
        let [bits] = self.query::<1>(id, cmd::LED_ERROR_READ)?;
        Ok(ErrorTriggers::from_bits(bits))
    }

    fn read_id(&mut self, id: u8) -> Result<u8, BusError> {
        let [reported] = self.query::<1>(id, cmd::ID_READ)?;
        Ok(reported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec as StdVec;

    /// UART that records writes and replays a scripted receive stream
    #[derive(Default)]
    struct ScriptedUart {
        written: StdVec<u8>,
        rx: VecDeque<u8>,
        echo: bool,
        discarded: usize,
    }

    impl ScriptedUart {
        fn replying(reply: &[u8]) -> Self {
            Self {
                rx: reply.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl UartTx for ScriptedUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.written.extend_from_slice(data);
            if self.echo {
                // Echo lands ahead of any reply
                for &b in data.iter().rev() {
                    self.rx.push_front(b);
                }
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for ScriptedUart {
        type Error = ();

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            if self.rx.len() < buf.len() {
                self.rx.clear();
                return Err(());
            }
            for slot in buf.iter_mut() {
                *slot = self.rx.pop_front().ok_or(())?;
            }
            Ok(buf.len())
        }
    }

    fn reply(id: u8, command: u8, params: &[u8]) -> Packet {
        build_packet(id, command, params)
    }

    #[test]
    fn test_move_packet_known_vector() {
        // id 1 to 120 degrees (position 500) over 1000 ms
        let mut bus = Lx16aBus::new(ScriptedUart::default(), Lx16aConfig::default());
        bus.move_to(1, 120.0, 1000).unwrap();

        assert_eq!(
            bus.release().written,
            [0x55, 0x55, 0x01, 0x07, 0x01, 0xF4, 0x01, 0xE8, 0x03, 0x16]
        );
    }

    #[test]
    fn test_checksum() {
        // id 1, len 3, ID_READ
        assert_eq!(checksum(&[0x01, 0x03, 0x0E]), !0x12u8);
        let packet = build_packet(1, cmd::ID_READ, &[]);
        assert_eq!(packet.as_slice(), [0x55, 0x55, 0x01, 0x03, 0x0E, 0xED]);
    }

    #[test]
    fn test_position_conversion() {
        assert_eq!(degrees_to_position(0.0), 0);
        assert_eq!(degrees_to_position(240.0), 1000);
        assert_eq!(degrees_to_position(81.0), 338);
        assert_eq!(degrees_to_position(138.0), 575);
        assert_eq!(degrees_to_position(300.0), 1000);
        assert_eq!(degrees_to_position(-5.0), 0);
        assert_eq!(position_to_degrees(500), 120.0);
        assert!(position_to_degrees(-4) < 0.0);
    }

    #[test]
    fn test_write_commands() {
        let mut bus = Lx16aBus::new(ScriptedUart::default(), Lx16aConfig::default());
        bus.set_vin_limits(3, 5000, 11500).unwrap();
        bus.set_temp_limit(3, 85).unwrap();
        bus.set_mode(3, ServoMode::Servo).unwrap();
        bus.set_torque(3, true).unwrap();
        bus.set_led_power(3, true).unwrap();
        bus.set_led_error_triggers(3, ErrorTriggers::NONE).unwrap();
        bus.set_angle_limits(3, 0.0, 240.0).unwrap();

        let mut expected = StdVec::new();
        expected.extend_from_slice(&build_packet(3, cmd::VIN_LIMIT_WRITE, &[0x88, 0x13, 0xEC, 0x2C]));
        expected.extend_from_slice(&build_packet(3, cmd::TEMP_MAX_LIMIT_WRITE, &[85]));
        expected.extend_from_slice(&build_packet(3, cmd::OR_MOTOR_MODE_WRITE, &[0, 0, 0, 0]));
        expected.extend_from_slice(&build_packet(3, cmd::LOAD_OR_UNLOAD_WRITE, &[1]));
        expected.extend_from_slice(&build_packet(3, cmd::LED_CTRL_WRITE, &[0]));
        expected.extend_from_slice(&build_packet(3, cmd::LED_ERROR_WRITE, &[0]));
        expected.extend_from_slice(&build_packet(3, cmd::ANGLE_LIMIT_WRITE, &[0, 0, 0xE8, 0x03]));

        assert_eq!(bus.release().written, expected);
    }

    #[test]
    fn test_read_position() {
        let uart = ScriptedUart::replying(&reply(2, cmd::POS_READ, &[0xF4, 0x01]));
        let mut bus = Lx16aBus::new(uart, Lx16aConfig::default());

        assert_eq!(bus.read_physical_angle(2), Ok(120.0));
        assert_eq!(bus.release().written, build_packet(2, cmd::POS_READ, &[]).as_slice());
    }

    #[test]
    fn test_read_id_and_triggers() {
        let mut stream = StdVec::new();
        stream.extend_from_slice(&reply(5, cmd::ID_READ, &[5]));
        stream.extend_from_slice(&reply(5, cmd::LED_ERROR_READ, &[0b101]));
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&stream), Lx16aConfig::default());

        assert_eq!(bus.read_id(5), Ok(5));
        let flags = bus.read_led_error_triggers(5).unwrap();
        assert!(flags.over_temperature);
        assert!(!flags.over_voltage);
        assert!(flags.rotor_locked);
    }

    #[test]
    fn test_silent_servo_is_no_response() {
        let mut bus = Lx16aBus::new(ScriptedUart::default(), Lx16aConfig::default());
        assert_eq!(bus.read_id(3), Err(BusError::NoResponse));
    }

    #[test]
    fn test_bad_checksum() {
        let mut frame = reply(4, cmd::POS_READ, &[0x00, 0x01]);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&frame), Lx16aConfig::default());
        assert_eq!(bus.read_physical_angle(4), Err(BusError::Checksum));
    }

    #[test]
    fn test_garbled_replies() {
        // Reply from another servo
        let frame = reply(6, cmd::ID_READ, &[6]);
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&frame), Lx16aConfig::default());
        assert_eq!(bus.read_id(4), Err(BusError::Garbled));

        // Reply to another command
        let frame = reply(4, cmd::LED_ERROR_READ, &[0]);
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&frame), Lx16aConfig::default());
        assert_eq!(bus.read_id(4), Err(BusError::Garbled));

        // Noise instead of a header
        let frame = [0x00, 0x55, 0x04, 0x04, 0x0E, 0x04, 0x00];
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&frame), Lx16aConfig::default());
        assert_eq!(bus.read_id(4), Err(BusError::Garbled));

        // Header then silence
        let frame = [0x55, 0x55, 0x04, 0x04, 0x0E];
        let mut bus = Lx16aBus::new(ScriptedUart::replying(&frame), Lx16aConfig::default());
        assert_eq!(bus.read_id(4), Err(BusError::Garbled));
    }

    #[test]
    fn test_echo_is_dropped() {
        let mut uart = ScriptedUart::replying(&reply(1, cmd::ID_READ, &[1]));
        uart.echo = true;
        let mut bus = Lx16aBus::new(uart, Lx16aConfig { echo: true });

        bus.move_to(1, 60.0, 100).unwrap();
        assert_eq!(bus.read_id(1), Ok(1));
        assert!(bus.release().rx.is_empty());
    }

    #[test]
    fn test_parse_response_errors() {
        let frame = reply(1, cmd::POS_READ, &[0x10, 0x00]);
        assert_eq!(parse_response(&frame, 1, cmd::POS_READ), Ok(&[0x10, 0x00][..]));
        assert_eq!(parse_response(&frame[..5], 1, cmd::POS_READ), Err(Lx16aError::InvalidHeader));
        assert_eq!(parse_response(&frame[..7], 1, cmd::POS_READ), Err(Lx16aError::WrongLength));
        assert_eq!(BusError::from(Lx16aError::WrongId), BusError::Garbled);
        assert_eq!(BusError::from(Lx16aError::ChecksumMismatch), BusError::Checksum);
    }
}
