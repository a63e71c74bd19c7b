//! Simulation backend.
//!
//! Provides simulated motor controllers, solenoids and distance sensors for
//! development and testing without physical hardware.

mod io;

pub use io::{SimDistanceSensor, SimDoubleSolenoid, SimMotor, SimSolenoid, SimulatedHardware};

use crate::mechanism::IntakeHandles;
use intake_common::intake::WiringConfig;

/// Clamp arm solenoid name.
pub const CLAMP_ARM: &str = "clamp_arm";
/// Kicker (push) solenoid name.
pub const INTAKE_KICKER: &str = "intake_kicker";
/// Single-acting extension solenoid name.
pub const LEFT_EXTENSION: &str = "left_extension";
/// Double-acting extension solenoid name.
pub const RIGHT_EXTENSION: &str = "right_extension";
/// Left infrared distance sensor name.
pub const LEFT_INFRARED: &str = "left_infrared";
/// Right infrared distance sensor name.
pub const RIGHT_INFRARED: &str = "right_infrared";

/// Factory assembling intake handles backed by `hw`.
///
/// Motor device ids come from `wiring`; all other devices use the names
/// above so tests can stimulate and inspect them through `hw`.
pub fn create_handles(hw: &SimulatedHardware, wiring: &WiringConfig) -> IntakeHandles {
    IntakeHandles {
        primary_motor: Box::new(hw.motor(wiring.primary_motor_id)),
        secondary_motor: Box::new(hw.motor(wiring.secondary_motor_id)),
        clamp_arm: Box::new(hw.solenoid(CLAMP_ARM)),
        kicker: Box::new(hw.solenoid(INTAKE_KICKER)),
        extension: Box::new(hw.solenoid(LEFT_EXTENSION)),
        extension_double: Box::new(hw.double_solenoid(RIGHT_EXTENSION)),
        left_distance: Box::new(hw.distance_sensor(LEFT_INFRARED)),
        right_distance: Box::new(hw.distance_sensor(RIGHT_INFRARED)),
    }
}
