//! Intake mechanism configuration.
//!
//! `IntakeConfig` is loaded from `intake.toml`:
//!
//! ```toml
//! cycle_time_us = 20000
//!
//! [shared]
//! service_name = "intake"
//!
//! [wiring]
//! primary_motor_id = 1
//! secondary_motor_id = 2
//! secondary_inverted = true
//!
//! [calibration]
//! containment_min_m = 0.10
//! containment_max_m = 0.15
//! contact_current_a = 5.0
//! sensor_units_per_meter = 100.0
//! clamp_motor_command = false
//! ```
//!
//! Every field has a default, so an empty file yields the calibrated
//! values the mechanism was tuned with.

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    CONTACT_CURRENT_A, CONTAINMENT_MAX_M, CONTAINMENT_MIN_M, CYCLE_TIME_US, PRIMARY_MOTOR_ID,
    SECONDARY_MOTOR_ID, SENSOR_UNITS_PER_METER,
};
use serde::{Deserialize, Serialize};

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}

fn default_true() -> bool {
    true
}

/// Top-level intake configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    /// Control cycle period in microseconds.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    #[serde(default)]
    pub wiring: WiringConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle_time_us: CYCLE_TIME_US,
            wiring: WiringConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

/// Motor wiring applied once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringConfig {
    /// Device id of the motor that receives the speed command.
    #[serde(default = "default_primary_id")]
    pub primary_motor_id: u8,

    /// Device id of the motor configured as follower.
    #[serde(default = "default_secondary_id")]
    pub secondary_motor_id: u8,

    /// Follower spins opposite to the leader.
    #[serde(default = "default_true")]
    pub secondary_inverted: bool,
}

fn default_primary_id() -> u8 {
    PRIMARY_MOTOR_ID
}

fn default_secondary_id() -> u8 {
    SECONDARY_MOTOR_ID
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            primary_motor_id: PRIMARY_MOTOR_ID,
            secondary_motor_id: SECONDARY_MOTOR_ID,
            secondary_inverted: true,
        }
    }
}

/// Empirically calibrated thresholds for the derived signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Containment band lower edge [m], inclusive.
    pub containment_min_m: f64,
    /// Containment band upper edge [m], inclusive.
    pub containment_max_m: f64,
    /// Contact current threshold [A], inclusive.
    pub contact_current_a: f64,
    /// Sensor native units per meter.
    pub sensor_units_per_meter: f64,
    /// Clamp `rotate` values to [-1, 1]. Off by default: callers are
    /// trusted to supply normalized speeds.
    pub clamp_motor_command: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            containment_min_m: CONTAINMENT_MIN_M,
            containment_max_m: CONTAINMENT_MAX_M,
            contact_current_a: CONTACT_CURRENT_A,
            sensor_units_per_meter: SENSOR_UNITS_PER_METER,
            clamp_motor_command: false,
        }
    }
}

impl CalibrationConfig {
    /// Whether `distance_m` lies inside the closed containment band.
    pub fn in_containment_band(&self, distance_m: f64) -> bool {
        (self.containment_min_m..=self.containment_max_m).contains(&distance_m)
    }
}

impl IntakeConfig {
    /// Validate the intake configuration.
    ///
    /// # Validation Rules
    /// 1. shared config valid (non-empty service name)
    /// 2. `cycle_time_us` > 0
    /// 3. primary and secondary motor ids differ
    /// 4. 0 <= `containment_min_m` < `containment_max_m`, both finite
    /// 5. `contact_current_a` > 0
    /// 6. `sensor_units_per_meter` > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_us must be greater than 0".to_string(),
            ));
        }

        if self.wiring.primary_motor_id == self.wiring.secondary_motor_id {
            return Err(ConfigError::ValidationError(format!(
                "primary and secondary motor share device id {}",
                self.wiring.primary_motor_id
            )));
        }

        let cal = &self.calibration;
        if !cal.containment_min_m.is_finite() || !cal.containment_max_m.is_finite() {
            return Err(ConfigError::ValidationError(
                "containment band must be finite".to_string(),
            ));
        }
        if cal.containment_min_m < 0.0 || cal.containment_min_m >= cal.containment_max_m {
            return Err(ConfigError::ValidationError(format!(
                "invalid containment band [{}, {}]",
                cal.containment_min_m, cal.containment_max_m
            )));
        }

        if cal.contact_current_a.is_nan() || cal.contact_current_a <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "contact_current_a must be positive, got {}",
                cal.contact_current_a
            )));
        }

        if cal.sensor_units_per_meter.is_nan() || cal.sensor_units_per_meter <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sensor_units_per_meter must be positive, got {}",
                cal.sensor_units_per_meter
            )));
        }

        Ok(())
    }
}
