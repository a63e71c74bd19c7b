//! Prelude module for common re-exports.
//!
//! ```rust
//! use intake_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::intake::{CalibrationConfig, IntakeConfig, WiringConfig};

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::driver::{DistanceSensor, DoubleSolenoid, HalError, MotorController, Solenoid};
pub use crate::hal::types::{DoubleSolenoidValue, IntakeOutputs};
