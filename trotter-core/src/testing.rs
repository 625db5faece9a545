//! Test doubles for the servo bus and timing traits

use std::collections::{BTreeMap, BTreeSet};
use std::vec::Vec;

use crate::config::RigConfig;
use crate::rig::Rig;
use crate::traits::{BusError, Clock, ErrorTriggers, Pacer, ServoBus, ServoMode};

/// One request seen by [`MockBus`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    VinLimits { id: u8, min_mv: u16, max_mv: u16 },
    TempLimit { id: u8, max_c: u8 },
    Mode { id: u8, mode: ServoMode },
    Torque { id: u8, enabled: bool },
    Led { id: u8, on: bool },
    LedTriggers { id: u8, triggers: ErrorTriggers },
    AngleLimits { id: u8, min: f32, max: f32 },
    Move { id: u8, angle: f32, duration_ms: u16 },
    ReadAngle { id: u8 },
    ReadTriggers { id: u8 },
    ReadId { id: u8 },
}

impl Command {
    pub fn id(&self) -> u8 {
        match *self {
            Command::VinLimits { id, .. }
            | Command::TempLimit { id, .. }
            | Command::Mode { id, .. }
            | Command::Torque { id, .. }
            | Command::Led { id, .. }
            | Command::LedTriggers { id, .. }
            | Command::AngleLimits { id, .. }
            | Command::Move { id, .. }
            | Command::ReadAngle { id }
            | Command::ReadTriggers { id }
            | Command::ReadId { id } => id,
        }
    }
}

/// In-memory servo bus
///
/// Writes are unacknowledged on the real bus, so they only fail when a
/// write failure is scripted. Reads fail for unresponsive or corrupt IDs.
#[derive(Debug, Default)]
pub struct MockBus {
    log: Vec<Command>,
    unresponsive: BTreeSet<u8>,
    corrupt: BTreeSet<u8>,
    write_failures: BTreeSet<u8>,
    reported_ids: BTreeMap<u8, u8>,
    flags: BTreeMap<u8, ErrorTriggers>,
    positions: BTreeMap<u8, f32>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &[Command] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn set_unresponsive(&mut self, id: u8) {
        self.unresponsive.insert(id);
    }

    pub fn set_corrupt(&mut self, id: u8) {
        self.corrupt.insert(id);
    }

    pub fn set_write_failure(&mut self, id: u8) {
        self.write_failures.insert(id);
    }

    pub fn set_reported_id(&mut self, id: u8, reported: u8) {
        self.reported_ids.insert(id, reported);
    }

    pub fn set_flags(&mut self, id: u8, flags: ErrorTriggers) {
        self.flags.insert(id, flags);
    }

    /// Moves commanded for `id`, in order
    pub fn moves_for(&self, id: u8) -> Vec<f32> {
        self.log
            .iter()
            .filter_map(|c| match *c {
                Command::Move { id: m, angle, .. } if m == id => Some(angle),
                _ => None,
            })
            .collect()
    }

    /// Number of LED-on commands sent to `id`
    pub fn led_on_count(&self, id: u8) -> usize {
        self.log
            .iter()
            .filter(|c| matches!(c, Command::Led { id: l, on: true } if *l == id))
            .count()
    }

    fn write(&mut self, command: Command) -> Result<(), BusError> {
        let id = command.id();
        self.log.push(command);
        if self.write_failures.contains(&id) {
            return Err(BusError::Write);
        }
        Ok(())
    }

    fn read(&mut self, command: Command) -> Result<(), BusError> {
        let id = command.id();
        self.log.push(command);
        if self.unresponsive.contains(&id) {
            return Err(BusError::NoResponse);
        }
        if self.corrupt.contains(&id) {
            return Err(BusError::Checksum);
        }
        Ok(())
    }
}

impl ServoBus for MockBus {
    fn set_vin_limits(&mut self, id: u8, min_mv: u16, max_mv: u16) -> Result<(), BusError> {
        self.write(Command::VinLimits { id, min_mv, max_mv })
    }

    fn set_temp_limit(&mut self, id: u8, max_c: u8) -> Result<(), BusError> {
        self.write(Command::TempLimit { id, max_c })
    }

    fn set_mode(&mut self, id: u8, mode: ServoMode) -> Result<(), BusError> {
        self.write(Command::Mode { id, mode })
    }

    fn set_torque(&mut self, id: u8, enabled: bool) -> Result<(), BusError> {
        self.write(Command::Torque { id, enabled })
    }

    fn set_led_power(&mut self, id: u8, on: bool) -> Result<(), BusError> {
        self.write(Command::Led { id, on })
    }

    fn set_led_error_triggers(&mut self, id: u8, triggers: ErrorTriggers) -> Result<(), BusError> {
        self.write(Command::LedTriggers { id, triggers })
    }

    fn set_angle_limits(&mut self, id: u8, min_deg: f32, max_deg: f32) -> Result<(), BusError> {
        self.write(Command::AngleLimits {
            id,
            min: min_deg,
            max: max_deg,
        })
    }

    fn move_to(&mut self, id: u8, angle_deg: f32, duration_ms: u16) -> Result<(), BusError> {
        self.write(Command::Move {
            id,
            angle: angle_deg,
            duration_ms,
        })?;
        self.positions.insert(id, angle_deg);
        Ok(())
    }

    fn read_physical_angle(&mut self, id: u8) -> Result<f32, BusError> {
        self.read(Command::ReadAngle { id })?;
        Ok(self.positions.get(&id).copied().unwrap_or(120.0))
    }

    fn read_led_error_triggers(&mut self, id: u8) -> Result<ErrorTriggers, BusError> {
        self.read(Command::ReadTriggers { id })?;
        Ok(self.flags.get(&id).copied().unwrap_or(ErrorTriggers::NONE))
    }

    fn read_id(&mut self, id: u8) -> Result<u8, BusError> {
        self.read(Command::ReadId { id })?;
        Ok(self.reported_ids.get(&id).copied().unwrap_or(id))
    }
}

/// Clock whose time only advances when paused
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_ms: u64,
    pauses: Vec<u32>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> &[u32] {
        &self.pauses
    }

    pub fn total_paused_ms(&self) -> u64 {
        self.pauses.iter().map(|&p| p as u64).sum()
    }
}

impl Pacer for VirtualClock {
    fn pause_ms(&mut self, ms: u32) {
        self.now_ms += ms as u64;
        self.pauses.push(ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

/// Quadruped rig past boot: torque on and the joint limit table applied
///
/// Set scripted failures on the bus after this, not before.
pub fn ready_rig(bus: MockBus) -> Rig<MockBus> {
    let config = RigConfig::quadruped();
    let mut rig = Rig::assemble(bus, &config.ids()).unwrap();
    for row in &config.joints {
        let mut joint = rig.joint(row.id).unwrap();
        joint.set_torque(true).unwrap();
        joint
            .set_angle_limits(row.angle_limits.min(), row.angle_limits.max())
            .unwrap();
    }
    rig.bus_mut().clear_log();
    rig
}
