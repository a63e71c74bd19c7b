//! Hardware abstraction layer traits and types.
//!
//! This module contains the handle traits implemented by hardware and
//! simulation backends, plus the value types they exchange.

pub mod driver;
pub mod types;
