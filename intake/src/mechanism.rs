//! Intake mechanism driver.
//!
//! Translates per-cycle intents into hardware outputs:
//!
//! ```text
//!  rotate/clamp/push/extend        flush() once per cycle
//!  ───────────────────────►  IntakeState  ──────────────────►  motors + solenoids
//!                                 │
//!                                 └─ motor_command reset to 0 after every flush
//! ```
//!
//! The motor register is consumed by each flush; pneumatic registers are
//! latched because the valves hold position without power. Sensor
//! predicates read hardware on demand and apply no filtering or hysteresis.

use intake_common::hal::driver::{
    DistanceSensor, DoubleSolenoid, HalError, MotorController, Solenoid,
};
use intake_common::hal::types::{DoubleSolenoidValue, IntakeOutputs};
use intake_common::intake::{CalibrationConfig, IntakeConfig};
use tracing::{debug, info, trace};

use crate::component::Component;
use crate::diagnostics::{DiagnosticValue, DiagnosticsRegistry};

/// Hardware handles owned by the intake.
pub struct IntakeHandles {
    /// Receives the speed command.
    pub primary_motor: Box<dyn MotorController>,
    /// Configured at setup to follow `primary_motor`.
    pub secondary_motor: Box<dyn MotorController>,
    pub clamp_arm: Box<dyn Solenoid>,
    pub kicker: Box<dyn Solenoid>,
    /// Single-acting extension valve.
    pub extension: Box<dyn Solenoid>,
    /// Double-acting extension valve, driven from the same intent.
    pub extension_double: Box<dyn DoubleSolenoid>,
    pub left_distance: Box<dyn DistanceSensor>,
    pub right_distance: Box<dyn DistanceSensor>,
}

/// Pending intents of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntakeState {
    /// Motor speed for this cycle, reset to 0 after each flush.
    pub motor_command: f64,
    /// Latched clamp intent.
    pub clamp_command: bool,
    /// Latched kicker intent.
    pub push_command: bool,
    /// Latched extension intent.
    pub extension_command: bool,
    /// Whether the arms are outside of the starting configuration.
    /// Diagnostic only, drives no hardware.
    pub arms_out: bool,
}

/// Intake mechanism driver.
pub struct Intake {
    handles: IntakeHandles,
    calibration: CalibrationConfig,
    secondary_inverted: bool,
    state: IntakeState,
    last_outputs: IntakeOutputs,
    flush_count: u64,
}

impl Intake {
    /// Create the driver. No hardware is touched until [`Component::setup`].
    pub fn new(handles: IntakeHandles, config: &IntakeConfig) -> Self {
        Self {
            handles,
            calibration: config.calibration,
            secondary_inverted: config.wiring.secondary_inverted,
            state: IntakeState::default(),
            last_outputs: IntakeOutputs::default(),
            flush_count: 0,
        }
    }

    /// Set the motor output for this cycle.
    ///
    /// Values pass through unchanged unless `clamp_motor_command` is
    /// configured, in which case they are limited to [-1, 1].
    pub fn rotate(&mut self, value: f64) {
        self.state.motor_command = if self.calibration.clamp_motor_command {
            value.clamp(-1.0, 1.0)
        } else {
            value
        };
    }

    /// Close or open the clamp arm.
    pub fn clamp(&mut self, value: bool) {
        self.state.clamp_command = value;
    }

    /// Fire or retract the kicker.
    pub fn push(&mut self, value: bool) {
        self.state.push_command = value;
    }

    /// Extend or retract the intake arms.
    pub fn extend(&mut self, value: bool) {
        self.state.extension_command = value;
    }

    pub fn arms_out(&self) -> bool {
        self.state.arms_out
    }

    pub fn set_arms_out(&mut self, value: bool) {
        self.state.arms_out = value;
    }

    /// Write all pending intents to hardware.
    ///
    /// The motor command is consumed even if a write fails, so a stale
    /// speed is never replayed on the next cycle. The first hardware error
    /// aborts the flush and is returned unchanged. Outputs written before
    /// the failure are still recorded in [`last_outputs`](Self::last_outputs).
    pub fn flush(&mut self) -> Result<(), HalError> {
        let motor = std::mem::take(&mut self.state.motor_command);
        let clamp = self.state.clamp_command;
        let push = self.state.push_command;
        let extension = self.state.extension_command;
        let extension_double = DoubleSolenoidValue::from_extended(extension);

        self.handles.primary_motor.set(motor)?;
        self.last_outputs.motor = motor;
        self.handles.clamp_arm.set(clamp)?;
        self.last_outputs.clamp = clamp;
        self.handles.kicker.set(push)?;
        self.last_outputs.push = push;
        self.handles.extension.set(extension)?;
        self.last_outputs.extension = extension;
        self.handles.extension_double.set(extension_double)?;
        self.last_outputs.extension_double = extension_double;

        self.flush_count += 1;
        trace!("intake flush #{}: {:?}", self.flush_count, self.last_outputs);
        Ok(())
    }

    /// Left and right object distances in meters.
    pub fn get_object_distance(&self) -> Result<(f64, f64), HalError> {
        let scale = self.calibration.sensor_units_per_meter;
        let left = self.handles.left_distance.distance()? / scale;
        let right = self.handles.right_distance.distance()? / scale;
        Ok((left, right))
    }

    /// Whether either sensor sees an object inside the containment band.
    pub fn is_object_contained(&self) -> Result<bool, HalError> {
        let (left, right) = self.get_object_distance()?;
        Ok(self.calibration.in_containment_band(left)
            || self.calibration.in_containment_band(right))
    }

    /// Whether the wheels are loaded, judged by primary motor current.
    pub fn are_actuators_contacting(&self) -> Result<bool, HalError> {
        let current = self.handles.primary_motor.output_current()?;
        Ok(current >= self.calibration.contact_current_a)
    }

    /// Pending intents.
    pub fn state(&self) -> IntakeState {
        self.state
    }

    /// Last value written to each output, including writes of a flush that
    /// failed partway.
    pub fn last_outputs(&self) -> IntakeOutputs {
        self.last_outputs
    }

    /// Number of successful flushes.
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    pub fn calibration(&self) -> &CalibrationConfig {
        &self.calibration
    }

    /// Install the intake's tunables and feedback entries.
    pub fn register_diagnostics(registry: &mut DiagnosticsRegistry<Self>) {
        registry.register_tunable(
            "intake/arms_out",
            "Whether the arms are outside of the starting configuration.",
            |intake| Ok(DiagnosticValue::Bool(intake.arms_out())),
            |intake, value| {
                intake.set_arms_out(value.as_bool()?);
                Ok(())
            },
        );
        registry.register_feedback(
            "intake/object_distance",
            "Left and right infrared distances in m.",
            |intake| {
                let (left, right) = intake.get_object_distance()?;
                Ok(DiagnosticValue::Pair(left, right))
            },
        );
        registry.register_feedback(
            "intake/object_contained",
            "Object inside the containment band.",
            |intake| Ok(DiagnosticValue::Bool(intake.is_object_contained()?)),
        );
        registry.register_feedback(
            "intake/actuators_contacting",
            "Wheel current above the contact threshold.",
            |intake| Ok(DiagnosticValue::Bool(intake.are_actuators_contacting()?)),
        );
        registry.register_feedback(
            "intake/motor_output",
            "Motor value written by the last flush.",
            |intake| Ok(DiagnosticValue::Number(intake.last_outputs().motor)),
        );
    }
}

impl Component for Intake {
    fn name(&self) -> &'static str {
        "intake"
    }

    fn setup(&mut self) -> Result<(), HalError> {
        let leader = self.handles.primary_motor.device_id();
        self.handles.secondary_motor.follow(leader)?;
        self.handles
            .secondary_motor
            .set_inverted(self.secondary_inverted)?;
        info!(
            "Intake setup: motor {} follows motor {} (inverted={})",
            self.handles.secondary_motor.device_id(),
            leader,
            self.secondary_inverted
        );
        Ok(())
    }

    fn on_enable(&mut self) {
        debug!("Intake enabled");
    }

    fn on_disable(&mut self) {
        debug!("Intake disabled");
    }

    fn tick(&mut self) -> Result<(), HalError> {
        self.flush()
    }
}
