//! System-wide constants for the intake workspace.
//!
//! Single source of truth for the calibrated thresholds and default paths.
//! The calibration values are empirical and only serve as defaults for
//! [`CalibrationConfig`](crate::intake::CalibrationConfig).

/// Default control cycle time in microseconds (50 Hz = 20 000 µs).
pub const CYCLE_TIME_US: u32 = 20_000;

/// Lower edge of the containment band [m], inclusive.
pub const CONTAINMENT_MIN_M: f64 = 0.10;

/// Upper edge of the containment band [m], inclusive.
pub const CONTAINMENT_MAX_M: f64 = 0.15;

/// Primary motor current [A] at or above which the wheels are considered
/// to be contacting an object.
pub const CONTACT_CURRENT_A: f64 = 5.0;

/// Native distance sensor units per meter (sensors report centimeters).
pub const SENSOR_UNITS_PER_METER: f64 = 100.0;

/// Default CAN device id of the primary (leader) intake motor.
pub const PRIMARY_MOTOR_ID: u8 = 1;

/// Default CAN device id of the secondary (follower) intake motor.
pub const SECONDARY_MOTOR_ID: u8 = 2;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/intake/intake.toml";

/// Canonical service name used for logging.
pub const INTAKE_SERVICE_NAME: &str = "intake";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(CYCLE_TIME_US > 0);
        assert!(CONTAINMENT_MIN_M >= 0.0);
        assert!(CONTAINMENT_MIN_M < CONTAINMENT_MAX_M);
        assert!(CONTACT_CURRENT_A > 0.0);
        assert!(SENSOR_UNITS_PER_METER > 0.0);
        assert_ne!(PRIMARY_MOTOR_ID, SECONDARY_MOTOR_ID);
    }
}
