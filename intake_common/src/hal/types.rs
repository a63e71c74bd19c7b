//! HAL value types.
//!
//! This module defines the values exchanged with hardware handles:
//! - `DoubleSolenoidValue` - Tri-state double-acting valve command
//! - `IntakeOutputs` - Snapshot of the outputs written by one flush

use serde::{Deserialize, Serialize};

/// Double-acting valve command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubleSolenoidValue {
    /// Both coils vented.
    #[default]
    Off,
    /// Forward coil energized.
    Forward,
    /// Reverse coil energized.
    Reverse,
}

impl DoubleSolenoidValue {
    /// Map an extension intent onto the valve: extended drives forward,
    /// retracted drives reverse. `Off` is never produced.
    pub const fn from_extended(extended: bool) -> Self {
        if extended { Self::Forward } else { Self::Reverse }
    }
}

/// Outputs written to hardware by the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntakeOutputs {
    /// Value sent to the primary motor.
    pub motor: f64,
    /// Clamp arm solenoid.
    pub clamp: bool,
    /// Kicker (push) solenoid.
    pub push: bool,
    /// Single-acting extension solenoid.
    pub extension: bool,
    /// Double-acting extension solenoid.
    pub extension_double: DoubleSolenoidValue,
}
