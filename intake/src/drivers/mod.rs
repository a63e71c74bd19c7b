//! Hardware backends for the intake handles.
//!
//! - [`simulation`] - Software simulation backend for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the handle traits from `intake_common::hal::driver`
//! 3. Provide a factory that assembles an [`IntakeHandles`](crate::mechanism::IntakeHandles)

pub mod simulation;
