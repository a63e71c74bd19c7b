//! # Intake Mechanism Library
//!
//! Per-cycle driver for the intake mechanism: two wheel motors (one an
//! inverted follower), clamp and kicker solenoids, a single plus a double
//! extension solenoid, and two infrared distance sensors.
//!
//! # Module Structure
//!
//! - [`mechanism`] - `Intake` driver: intents, flush, sensor predicates
//! - [`component`] - `Component` lifecycle trait
//! - [`core`] - `CycleRunner`, the owning control loop
//! - [`diagnostics`] - Named tunable/feedback registry
//! - [`drivers`] - Hardware backends (simulation)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  decision logic ──intents──►  CycleRunner ──tick()──► Intake   │
//! │                                                       │        │
//! │  DiagnosticsRegistry ◄──getters/setters───────────────┤        │
//! │                                                       ▼        │
//! │                                        IntakeHandles (traits)  │
//! │                                          ├─ hardware backend   │
//! │                                          └─ simulation backend │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod component;
pub mod core;
pub mod diagnostics;
pub mod drivers;
pub mod mechanism;

// Re-export key types for convenience
pub use crate::component::Component;
pub use crate::core::CycleRunner;
pub use crate::diagnostics::{DiagnosticValue, DiagnosticsRegistry};
pub use crate::mechanism::{Intake, IntakeHandles, IntakeState};
