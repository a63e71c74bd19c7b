//! Hardware handle traits and error types.
//!
//! This module defines:
//! - `MotorController` - Speed controller with follower support and current sensing
//! - `Solenoid` - Single-acting pneumatic output
//! - `DoubleSolenoid` - Double-acting (tri-state) pneumatic output
//! - `DistanceSensor` - Analog distance sensor reporting native units
//! - `HalError` enum - Error types for handle operations
//!
//! Backends (real hardware or the simulation driver) implement these traits.
//! Mechanism drivers own boxed handles and never catch the errors they
//! return; faults propagate to the scheduler that owns failure policy.

use crate::hal::types::DoubleSolenoidValue;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// Handle initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware communication error (bus timeout, CRC, ...)
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Referenced device does not exist on the bus
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Device was present but stopped responding
    #[error("Device disconnected: {0}")]
    Disconnected(String),
}

/// Motor speed controller.
///
/// Output values are normalized duty cycles, nominally in [-1.0, 1.0].
/// The controller does not range-check them.
pub trait MotorController {
    /// Bus identifier, used to configure followers.
    fn device_id(&self) -> u8;

    /// Command a normalized output.
    fn set(&mut self, output: f64) -> Result<(), HalError>;

    /// Last commanded output.
    fn get(&self) -> Result<f64, HalError>;

    /// Mirror the output of the controller with `leader_id` every cycle.
    ///
    /// Configured once at setup; afterwards `set` on the follower is not
    /// required.
    fn follow(&mut self, leader_id: u8) -> Result<(), HalError>;

    /// Invert the direction of the applied output.
    fn set_inverted(&mut self, inverted: bool) -> Result<(), HalError>;

    /// Measured output current in amperes.
    fn output_current(&self) -> Result<f64, HalError>;
}

/// Single-acting pneumatic output (on/off).
pub trait Solenoid {
    /// Energize (`true`) or vent (`false`) the valve.
    fn set(&mut self, on: bool) -> Result<(), HalError>;

    /// Current commanded state.
    fn get(&self) -> Result<bool, HalError>;
}

/// Double-acting pneumatic output (forward / reverse / off).
pub trait DoubleSolenoid {
    /// Drive the valve to `value`.
    fn set(&mut self, value: DoubleSolenoidValue) -> Result<(), HalError>;

    /// Current commanded value.
    fn get(&self) -> Result<DoubleSolenoidValue, HalError>;
}

/// Analog distance sensor.
pub trait DistanceSensor {
    /// Measured distance in the sensor's native units (centimeters for the
    /// infrared sensors on the intake).
    fn distance(&self) -> Result<f64, HalError>;
}
