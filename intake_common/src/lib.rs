//! Intake Common Library
//!
//! This crate provides the hardware handle traits, shared value types and
//! configuration loading utilities used by the intake workspace crates.
//!
//! # Module Structure
//!
//! - [`hal`] - Hardware handle traits, HAL error and value types
//! - [`intake`] - Intake mechanism configuration (wiring + calibration)
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Calibrated defaults and system constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use intake_common::prelude::*;
//!
//! let value = DoubleSolenoidValue::from_extended(true);
//! assert_eq!(value, DoubleSolenoidValue::Forward);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod intake;
pub mod prelude;
