//! Simulated I/O bank and hardware handles.
//!
//! `SimulatedHardware` owns the state of every simulated device:
//! - Motor controllers keyed by device id, with follower/inversion wiring
//!   and an injectable output current
//! - Single and double solenoids keyed by name, with write counters
//! - Distance sensors keyed by name, reporting raw native units
//!
//! Handles share the bank through `Rc<RefCell<_>>`; everything runs on the
//! control thread, so no locking is involved. Any device can be given an
//! injected fault, which every subsequent operation on it returns.

use intake_common::hal::driver::{
    DistanceSensor, DoubleSolenoid, HalError, MotorController, Solenoid,
};
use intake_common::hal::types::DoubleSolenoidValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Simulated motor controller state.
#[derive(Debug, Clone, Default)]
struct MotorState {
    /// Last value passed to `set`
    commanded: f64,
    /// Direction inversion
    inverted: bool,
    /// Leader device id when configured as follower
    leader: Option<u8>,
    /// Output current reported to `output_current`
    current_a: f64,
    /// Number of `set` calls
    writes: u64,
    /// Fault returned by every operation while present
    fault: Option<HalError>,
}

#[derive(Debug, Clone, Default)]
struct SolenoidState {
    on: bool,
    writes: u64,
    fault: Option<HalError>,
}

#[derive(Debug, Clone, Default)]
struct DoubleSolenoidState {
    value: DoubleSolenoidValue,
    writes: u64,
    fault: Option<HalError>,
}

#[derive(Debug, Clone, Default)]
struct SensorState {
    /// Raw reading in native units
    raw: f64,
    fault: Option<HalError>,
}

/// Backing store for all simulated devices.
#[derive(Debug, Default)]
struct IoBank {
    motors: HashMap<u8, MotorState>,
    solenoids: HashMap<String, SolenoidState>,
    double_solenoids: HashMap<String, DoubleSolenoidState>,
    sensors: HashMap<String, SensorState>,
}

impl IoBank {
    fn motor(&self, id: u8) -> Result<&MotorState, HalError> {
        let state = self
            .motors
            .get(&id)
            .ok_or_else(|| HalError::DeviceNotFound(format!("motor {id}")))?;
        match &state.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(state),
        }
    }

    fn motor_mut(&mut self, id: u8) -> Result<&mut MotorState, HalError> {
        let state = self
            .motors
            .get_mut(&id)
            .ok_or_else(|| HalError::DeviceNotFound(format!("motor {id}")))?;
        match &state.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(state),
        }
    }

    /// Output actually applied by motor `id` after follower and inversion
    /// wiring is resolved.
    fn applied_output(&self, id: u8) -> Option<f64> {
        let state = self.motors.get(&id)?;
        let sign = if state.inverted { -1.0 } else { 1.0 };
        match state.leader {
            Some(leader) => self.motors.get(&leader).map(|l| l.commanded * sign),
            None => Some(state.commanded * sign),
        }
    }
}

/// Shared simulated I/O bank.
///
/// Cloning yields another view of the same bank.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHardware {
    bank: Rc<RefCell<IoBank>>,
}

impl SimulatedHardware {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or re-attach to) motor controller `id`.
    pub fn motor(&self, id: u8) -> SimMotor {
        self.bank.borrow_mut().motors.entry(id).or_default();
        SimMotor {
            id,
            bank: Rc::clone(&self.bank),
        }
    }

    /// Create (or re-attach to) single solenoid `name`.
    pub fn solenoid(&self, name: &str) -> SimSolenoid {
        self.bank
            .borrow_mut()
            .solenoids
            .entry(name.to_string())
            .or_default();
        SimSolenoid {
            name: name.to_string(),
            bank: Rc::clone(&self.bank),
        }
    }

    /// Create (or re-attach to) double solenoid `name`.
    pub fn double_solenoid(&self, name: &str) -> SimDoubleSolenoid {
        self.bank
            .borrow_mut()
            .double_solenoids
            .entry(name.to_string())
            .or_default();
        SimDoubleSolenoid {
            name: name.to_string(),
            bank: Rc::clone(&self.bank),
        }
    }

    /// Create (or re-attach to) distance sensor `name`.
    pub fn distance_sensor(&self, name: &str) -> SimDistanceSensor {
        self.bank
            .borrow_mut()
            .sensors
            .entry(name.to_string())
            .or_default();
        SimDistanceSensor {
            name: name.to_string(),
            bank: Rc::clone(&self.bank),
        }
    }

    // ─── Stimulus ───────────────────────────────────────────────────

    /// Set the raw reading (native units) of sensor `name`.
    pub fn set_raw_distance(&self, name: &str, raw: f64) {
        if let Some(sensor) = self.bank.borrow_mut().sensors.get_mut(name) {
            trace!("sensor {} raw = {}", name, raw);
            sensor.raw = raw;
        }
    }

    /// Set the output current reported by motor `id`.
    pub fn set_motor_current(&self, id: u8, amps: f64) {
        if let Some(motor) = self.bank.borrow_mut().motors.get_mut(&id) {
            trace!("motor {} current = {}A", id, amps);
            motor.current_a = amps;
        }
    }

    /// Make every operation on motor `id` fail with `fault`.
    pub fn fail_motor(&self, id: u8, fault: HalError) {
        if let Some(motor) = self.bank.borrow_mut().motors.get_mut(&id) {
            debug!("motor {} fault injected: {}", id, fault);
            motor.fault = Some(fault);
        }
    }

    /// Make every operation on single solenoid `name` fail with `fault`.
    pub fn fail_solenoid(&self, name: &str, fault: HalError) {
        if let Some(solenoid) = self.bank.borrow_mut().solenoids.get_mut(name) {
            debug!("solenoid {} fault injected: {}", name, fault);
            solenoid.fault = Some(fault);
        }
    }

    /// Make every read of sensor `name` fail with `fault`.
    pub fn fail_sensor(&self, name: &str, fault: HalError) {
        if let Some(sensor) = self.bank.borrow_mut().sensors.get_mut(name) {
            debug!("sensor {} fault injected: {}", name, fault);
            sensor.fault = Some(fault);
        }
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut bank = self.bank.borrow_mut();
        bank.motors.values_mut().for_each(|m| m.fault = None);
        bank.solenoids.values_mut().for_each(|s| s.fault = None);
        bank.double_solenoids.values_mut().for_each(|s| s.fault = None);
        bank.sensors.values_mut().for_each(|s| s.fault = None);
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Last value commanded to motor `id` through `set`.
    pub fn motor_command(&self, id: u8) -> Option<f64> {
        self.bank.borrow().motors.get(&id).map(|m| m.commanded)
    }

    /// Output applied by motor `id`, resolving follower and inversion.
    pub fn applied_output(&self, id: u8) -> Option<f64> {
        self.bank.borrow().applied_output(id)
    }

    /// Leader of motor `id`, if it is configured as follower.
    pub fn motor_leader(&self, id: u8) -> Option<u8> {
        self.bank.borrow().motors.get(&id).and_then(|m| m.leader)
    }

    /// Number of `set` calls received by motor `id`.
    pub fn motor_writes(&self, id: u8) -> u64 {
        self.bank.borrow().motors.get(&id).map_or(0, |m| m.writes)
    }

    /// Current state of single solenoid `name`.
    pub fn solenoid_state(&self, name: &str) -> Option<bool> {
        self.bank.borrow().solenoids.get(name).map(|s| s.on)
    }

    /// Number of writes received by single solenoid `name`.
    pub fn solenoid_writes(&self, name: &str) -> u64 {
        self.bank.borrow().solenoids.get(name).map_or(0, |s| s.writes)
    }

    /// Current value of double solenoid `name`.
    pub fn double_solenoid_state(&self, name: &str) -> Option<DoubleSolenoidValue> {
        self.bank.borrow().double_solenoids.get(name).map(|s| s.value)
    }

    /// Number of writes received by double solenoid `name`.
    pub fn double_solenoid_writes(&self, name: &str) -> u64 {
        self.bank
            .borrow()
            .double_solenoids
            .get(name)
            .map_or(0, |s| s.writes)
    }
}

/// Simulated motor controller handle.
#[derive(Debug, Clone)]
pub struct SimMotor {
    id: u8,
    bank: Rc<RefCell<IoBank>>,
}

impl MotorController for SimMotor {
    fn device_id(&self) -> u8 {
        self.id
    }

    fn set(&mut self, output: f64) -> Result<(), HalError> {
        let mut bank = self.bank.borrow_mut();
        let state = bank.motor_mut(self.id)?;
        state.commanded = output;
        state.writes += 1;
        Ok(())
    }

    fn get(&self) -> Result<f64, HalError> {
        Ok(self.bank.borrow().motor(self.id)?.commanded)
    }

    fn follow(&mut self, leader_id: u8) -> Result<(), HalError> {
        if leader_id == self.id {
            return Err(HalError::ConfigError(format!(
                "motor {} cannot follow itself",
                self.id
            )));
        }
        let mut bank = self.bank.borrow_mut();
        if !bank.motors.contains_key(&leader_id) {
            return Err(HalError::DeviceNotFound(format!(
                "leader motor {leader_id} for follower {}",
                self.id
            )));
        }
        bank.motor_mut(self.id)?.leader = Some(leader_id);
        debug!("motor {} following motor {}", self.id, leader_id);
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), HalError> {
        self.bank.borrow_mut().motor_mut(self.id)?.inverted = inverted;
        Ok(())
    }

    fn output_current(&self) -> Result<f64, HalError> {
        Ok(self.bank.borrow().motor(self.id)?.current_a)
    }
}

/// Simulated single solenoid handle.
#[derive(Debug, Clone)]
pub struct SimSolenoid {
    name: String,
    bank: Rc<RefCell<IoBank>>,
}

impl SimSolenoid {
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut SolenoidState) -> R,
    ) -> Result<R, HalError> {
        let mut bank = self.bank.borrow_mut();
        let state = bank
            .solenoids
            .get_mut(&self.name)
            .ok_or_else(|| HalError::DeviceNotFound(format!("solenoid {}", self.name)))?;
        if let Some(fault) = &state.fault {
            return Err(fault.clone());
        }
        Ok(f(state))
    }
}

impl Solenoid for SimSolenoid {
    fn set(&mut self, on: bool) -> Result<(), HalError> {
        self.with_state(|s| {
            s.on = on;
            s.writes += 1;
        })
    }

    fn get(&self) -> Result<bool, HalError> {
        self.with_state(|s| s.on)
    }
}

/// Simulated double solenoid handle.
#[derive(Debug, Clone)]
pub struct SimDoubleSolenoid {
    name: String,
    bank: Rc<RefCell<IoBank>>,
}

impl SimDoubleSolenoid {
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut DoubleSolenoidState) -> R,
    ) -> Result<R, HalError> {
        let mut bank = self.bank.borrow_mut();
        let state = bank.double_solenoids.get_mut(&self.name).ok_or_else(|| {
            HalError::DeviceNotFound(format!("double solenoid {}", self.name))
        })?;
        if let Some(fault) = &state.fault {
            return Err(fault.clone());
        }
        Ok(f(state))
    }
}

impl DoubleSolenoid for SimDoubleSolenoid {
    fn set(&mut self, value: DoubleSolenoidValue) -> Result<(), HalError> {
        self.with_state(|s| {
            s.value = value;
            s.writes += 1;
        })
    }

    fn get(&self) -> Result<DoubleSolenoidValue, HalError> {
        self.with_state(|s| s.value)
    }
}

/// Simulated analog distance sensor handle.
#[derive(Debug, Clone)]
pub struct SimDistanceSensor {
    name: String,
    bank: Rc<RefCell<IoBank>>,
}

impl DistanceSensor for SimDistanceSensor {
    fn distance(&self) -> Result<f64, HalError> {
        let bank = self.bank.borrow();
        let state = bank
            .sensors
            .get(&self.name)
            .ok_or_else(|| HalError::DeviceNotFound(format!("sensor {}", self.name)))?;
        match &state.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(state.raw),
        }
    }
}
