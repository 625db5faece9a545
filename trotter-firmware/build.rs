//! Build script for trotter-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates rig.toml at compile time
//! - Generates the rig configuration table the firmware boots with

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use trotter_core::config::{
    BootConfig, HomingProfile, JointConfig, JointKind, JointPosition, Leg, RigConfig,
    TimingConfig, JOINT_COUNT,
};
use trotter_core::actuator::PowerLimits;
use trotter_core::motion::Sign;
use trotter_core::traits::ErrorTriggers;

fn main() {
    setup_linker();
    let file = load_config();
    let rig = validate_config(&file);
    generate_config(&file, &rig);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RigFile {
    bus: BusSection,
    boot: BootSection,
    timing: TimingSection,
    joint: Vec<JointSection>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BusSection {
    baudrate: u32,
    response_timeout_ms: u32,
    #[serde(default = "default_data_bits")]
    data_bits: u8,
    #[serde(default = "default_parity")]
    parity: String,
    #[serde(default = "default_stop_bits")]
    stop_bits: u8,
    #[serde(default)]
    echo: bool,
}

fn default_data_bits() -> u8 {
    8
}

fn default_parity() -> String {
    "none".to_string()
}

fn default_stop_bits() -> u8 {
    1
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BootSection {
    min_voltage_mv: u16,
    max_voltage_mv: u16,
    temp_limit_c: u8,
    pace_ms: u32,
    led_flashes: u8,
    led_flash_ms: u32,
    #[serde(default)]
    led_error_triggers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimingSection {
    homing_move_ms: u16,
    homing_settle_ms: u32,
    rest_move_ms: u16,
    rest_settle_ms: u32,
    readback_pace_ms: u32,
    gait_window_ms: u32,
    tick_interval_ms: u32,
    gait_transit_ms: u16,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JointSection {
    id: u8,
    leg: String,
    kind: String,
    limits: [f32; 2],
    home: f32,
    amplitude: f32,
    sign: String,
}

/// Read and parse rig.toml
fn load_config() -> RigFile {
    // Re-run if rig.toml changes
    println!("cargo:rerun-if-changed=rig.toml");

    let config_path = Path::new("rig.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: rig.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a rig.toml configuration file.            ║\n\
            ║  Please create one in the trotter-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read rig.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax errors and missing or unknown keys both land here
    match toml::from_str(&config_content) {
        Ok(file) => file,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid rig.toml                                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fail the build with a list of problems
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn parse_leg(name: &str) -> Option<Leg> {
    match name {
        "front" => Some(Leg::Front),
        "left" => Some(Leg::Left),
        "back" => Some(Leg::Back),
        "right" => Some(Leg::Right),
        _ => None,
    }
}

fn parse_kind(name: &str) -> Option<JointKind> {
    match name {
        "ankle" => Some(JointKind::Ankle),
        "knee" => Some(JointKind::Knee),
        _ => None,
    }
}

fn parse_sign(name: &str) -> Option<Sign> {
    match name {
        "positive" => Some(Sign::Positive),
        "negative" => Some(Sign::Negative),
        _ => None,
    }
}

/// Check the field values, then the rig invariants
fn validate_config(file: &RigFile) -> RigConfig {
    let mut errors = Vec::new();

    if file.bus.baudrate == 0 {
        errors.push("[bus] baudrate must be non-zero".to_string());
    }
    if file.bus.response_timeout_ms == 0 {
        errors.push("[bus] response_timeout_ms must be non-zero".to_string());
    }
    if data_bits_path(file.bus.data_bits).is_none() {
        errors.push("[bus] data_bits must be 7 or 8".to_string());
    }
    if parity_path(&file.bus.parity).is_none() {
        errors.push("[bus] parity must be 'none', 'even' or 'odd'".to_string());
    }
    if stop_bits_path(file.bus.stop_bits).is_none() {
        errors.push("[bus] stop_bits must be 1 or 2".to_string());
    }

    let mut triggers = ErrorTriggers::NONE;
    for name in &file.boot.led_error_triggers {
        match name.as_str() {
            "over_temperature" => triggers.over_temperature = true,
            "over_voltage" => triggers.over_voltage = true,
            "rotor_locked" => triggers.rotor_locked = true,
            other => errors.push(format!("[boot] unknown LED error trigger '{}'", other)),
        }
    }

    if file.joint.len() != JOINT_COUNT {
        errors.push(format!(
            "expected {} [[joint]] entries, found {}",
            JOINT_COUNT,
            file.joint.len()
        ));
    }

    let mut joints = Vec::with_capacity(JOINT_COUNT);
    for (i, joint) in file.joint.iter().enumerate() {
        let leg = parse_leg(&joint.leg);
        let kind = parse_kind(&joint.kind);
        let sign = parse_sign(&joint.sign);

        if leg.is_none() {
            errors.push(format!(
                "joint {}: leg must be 'front', 'left', 'back' or 'right'",
                i
            ));
        }
        if kind.is_none() {
            errors.push(format!("joint {}: kind must be 'ankle' or 'knee'", i));
        }
        if sign.is_none() {
            errors.push(format!("joint {}: sign must be 'positive' or 'negative'", i));
        }

        if let (Some(leg), Some(kind), Some(sign)) = (leg, kind, sign) {
            joints.push(JointConfig::new(
                joint.id,
                JointPosition::new(leg, kind),
                (joint.limits[0], joint.limits[1]),
                joint.home,
                joint.amplitude,
                sign,
            ));
        }
    }

    if !errors.is_empty() {
        fail("Invalid rig.toml fields", &errors);
    }

    let Ok(joints) = <[JointConfig; JOINT_COUNT]>::try_from(joints) else {
        fail("Invalid rig.toml fields", &["joint table incomplete".to_string()]);
    };

    let rig = RigConfig {
        joints,
        boot: BootConfig {
            power: PowerLimits::new(file.boot.min_voltage_mv, file.boot.max_voltage_mv),
            temp_limit_c: file.boot.temp_limit_c,
            pace_ms: file.boot.pace_ms,
            led_error_triggers: triggers,
            led_flashes: file.boot.led_flashes,
            led_flash_ms: file.boot.led_flash_ms,
        },
        timing: TimingConfig {
            homing: HomingProfile {
                move_ms: file.timing.homing_move_ms,
                settle_ms: file.timing.homing_settle_ms,
                readback: true,
            },
            rest: HomingProfile {
                move_ms: file.timing.rest_move_ms,
                settle_ms: file.timing.rest_settle_ms,
                readback: false,
            },
            readback_pace_ms: file.timing.readback_pace_ms,
            gait_window_ms: file.timing.gait_window_ms,
            tick_interval_ms: file.timing.tick_interval_ms,
            gait_transit_ms: file.timing.gait_transit_ms,
        },
    };

    if let Err(e) = rig.validate() {
        fail("Invalid rig configuration", &[e.to_string()]);
    }

    println!("cargo:warning=rig.toml validated successfully");
    rig
}

fn leg_path(leg: Leg) -> &'static str {
    match leg {
        Leg::Front => "Leg::Front",
        Leg::Left => "Leg::Left",
        Leg::Back => "Leg::Back",
        Leg::Right => "Leg::Right",
    }
}

fn kind_path(kind: JointKind) -> &'static str {
    match kind {
        JointKind::Ankle => "JointKind::Ankle",
        JointKind::Knee => "JointKind::Knee",
    }
}

fn sign_path(sign: Sign) -> &'static str {
    match sign {
        Sign::Positive => "Sign::Positive",
        Sign::Negative => "Sign::Negative",
    }
}

fn data_bits_path(bits: u8) -> Option<&'static str> {
    match bits {
        7 => Some("DataBits::Seven"),
        8 => Some("DataBits::Eight"),
        _ => None,
    }
}

fn parity_path(name: &str) -> Option<&'static str> {
    match name {
        "none" => Some("Parity::None"),
        "even" => Some("Parity::Even"),
        "odd" => Some("Parity::Odd"),
        _ => None,
    }
}

fn stop_bits_path(bits: u8) -> Option<&'static str> {
    match bits {
        1 => Some("StopBits::One"),
        2 => Some("StopBits::Two"),
        _ => None,
    }
}

/// Write `rig_config.rs` into OUT_DIR
fn generate_config(file: &RigFile, rig: &RigConfig) {
    let mut out = String::new();
    out.push_str("// Generated from rig.toml by build.rs\n\n");

    // Field values were checked in validate_config
    let bus = &file.bus;
    out.push_str(&format!(
        "pub const BUS: BusSettings = BusSettings {{\n    \
         uart: UartConfig {{\n        \
         baudrate: {},\n        \
         data_bits: {},\n        \
         parity: {},\n        \
         stop_bits: {},\n        \
         response_timeout_ms: {},\n    }},\n    \
         echo: {},\n}};\n\n",
        bus.baudrate,
        data_bits_path(bus.data_bits).unwrap_or("DataBits::Eight"),
        parity_path(&bus.parity).unwrap_or("Parity::None"),
        stop_bits_path(bus.stop_bits).unwrap_or("StopBits::One"),
        bus.response_timeout_ms,
        bus.echo
    ));

    out.push_str("pub const RIG: RigConfig = RigConfig {\n    joints: [\n");
    for joint in &rig.joints {
        out.push_str(&format!(
            "        JointConfig::new({}, JointPosition::new({}, {}), ({:?}, {:?}), {:?}, {:?}, {}),\n",
            joint.id.get(),
            leg_path(joint.position.leg),
            kind_path(joint.position.kind),
            joint.angle_limits.min(),
            joint.angle_limits.max(),
            joint.home_angle,
            joint.gait.amplitude,
            sign_path(joint.gait.sign),
        ));
    }
    out.push_str("    ],\n");

    let boot = &rig.boot;
    let triggers = boot.led_error_triggers;
    out.push_str(&format!(
        "    boot: BootConfig {{\n        \
         power: PowerLimits::new({}, {}),\n        \
         temp_limit_c: {},\n        \
         pace_ms: {},\n        \
         led_error_triggers: ErrorTriggers {{ over_temperature: {}, over_voltage: {}, rotor_locked: {} }},\n        \
         led_flashes: {},\n        \
         led_flash_ms: {},\n    }},\n",
        boot.power.min_mv,
        boot.power.max_mv,
        boot.temp_limit_c,
        boot.pace_ms,
        triggers.over_temperature,
        triggers.over_voltage,
        triggers.rotor_locked,
        boot.led_flashes,
        boot.led_flash_ms,
    ));

    let timing = &rig.timing;
    out.push_str(&format!(
        "    timing: TimingConfig {{\n        \
         homing: HomingProfile {{ move_ms: {}, settle_ms: {}, readback: true }},\n        \
         rest: HomingProfile {{ move_ms: {}, settle_ms: {}, readback: false }},\n        \
         readback_pace_ms: {},\n        \
         gait_window_ms: {},\n        \
         tick_interval_ms: {},\n        \
         gait_transit_ms: {},\n    }},\n}};\n",
        timing.homing.move_ms,
        timing.homing.settle_ms,
        timing.rest.move_ms,
        timing.rest.settle_ms,
        timing.readback_pace_ms,
        timing.gait_window_ms,
        timing.tick_interval_ms,
        timing.gait_transit_ms,
    ));

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("rig_config.rs"), out).unwrap();
}
