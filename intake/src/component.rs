//! Component lifecycle trait.
//!
//! Mechanisms are driven by an owning scheduler (see [`CycleRunner`](crate::core::CycleRunner))
//! through this trait. There is no implicit registration: the scheduler
//! holds the component and calls the hooks explicitly.

use intake_common::hal::driver::HalError;

/// Trait defining the per-cycle contract of a mechanism component.
///
/// # Lifecycle
///
/// 1. `setup()` - Called once after construction, before the first cycle
/// 2. `on_enable()` - Called on every transition into the enabled state
/// 3. `tick()` - Called once per control cycle while enabled, after all
///    intents for the cycle have been set
/// 4. `on_disable()` - Called on every transition out of the enabled state
///
/// # Timing Contracts
///
/// | Operation | Blocking | Called |
/// |-----------|----------|--------|
/// | `setup()` | allowed | once |
/// | `on_enable()` / `on_disable()` | no | per transition |
/// | `tick()` | **no** | every cycle |
pub trait Component {
    /// Component identifier used in logs.
    fn name(&self) -> &'static str;

    /// One-time hardware configuration (follower wiring, inversion, ...).
    fn setup(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    /// Robot transitioned to enabled.
    fn on_enable(&mut self) {}

    /// Robot transitioned to disabled.
    fn on_disable(&mut self) {}

    /// Write pending intents to hardware.
    ///
    /// Hardware faults are returned unchanged; the scheduler decides what
    /// to do with them.
    fn tick(&mut self) -> Result<(), HalError>;
}
