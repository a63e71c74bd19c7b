//! Cycle runner and control loop management.
//!
//! `CycleRunner` is the owning scheduler of a [`Component`]. Each cycle it
//! lets the caller set intents, then calls `tick()` exactly once. It owns
//! the enable/disable transitions and the failure policy: a tick error
//! disables the component and is returned to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use intake_common::hal::driver::HalError;
use tracing::{debug, error, info, warn};

use crate::component::Component;

/// Timing statistics for loop monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Number of timing violations (cycle exceeded target)
    pub timing_violations: u64,
    /// Maximum observed cycle time
    pub max_cycle_time_us: u64,
    /// Sum of cycle times for average calculation
    pub total_cycle_time_us: u64,
}

impl TimingStats {
    /// Average cycle time in microseconds (0 if no cycles).
    pub fn avg_cycle_time_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.total_cycle_time_us / self.cycle_count
        }
    }

    fn record(&mut self, cycle_time_us: u64, target_us: u64) -> bool {
        self.cycle_count += 1;
        self.total_cycle_time_us += cycle_time_us;
        self.max_cycle_time_us = self.max_cycle_time_us.max(cycle_time_us);
        let overrun = cycle_time_us > target_us;
        if overrun {
            self.timing_violations += 1;
        }
        overrun
    }
}

/// Owning scheduler for a single component.
pub struct CycleRunner<C: Component> {
    component: C,
    cycle_time: Duration,
    initialized: bool,
    enabled: bool,
    running: Arc<AtomicBool>,
    stats: TimingStats,
}

impl<C: Component> CycleRunner<C> {
    /// Wrap `component`, pacing cycles at `cycle_time`.
    pub fn new(component: C, cycle_time: Duration) -> Self {
        info!(
            "CycleRunner created for '{}', cycle_time={}us",
            component.name(),
            cycle_time.as_micros()
        );
        Self {
            component,
            cycle_time,
            initialized: false,
            enabled: false,
            running: Arc::new(AtomicBool::new(true)),
            stats: TimingStats::default(),
        }
    }

    /// Run the component's one-time setup.
    ///
    /// # Errors
    /// Returns the setup error; the runner stays uninitialized.
    pub fn init(&mut self) -> Result<(), HalError> {
        if self.initialized {
            return Ok(());
        }
        info!("Initializing '{}'...", self.component.name());
        self.component.setup()?;
        self.initialized = true;
        Ok(())
    }

    /// Transition to enabled. No-op if already enabled.
    pub fn enable(&mut self) -> Result<(), HalError> {
        if !self.initialized {
            return Err(HalError::InitFailed(format!(
                "'{}' enabled before init",
                self.component.name()
            )));
        }
        if !self.enabled {
            self.enabled = true;
            info!("'{}' enabled", self.component.name());
            self.component.on_enable();
        }
        Ok(())
    }

    /// Transition to disabled. No-op if already disabled.
    pub fn disable(&mut self) {
        if self.enabled {
            self.enabled = false;
            info!("'{}' disabled", self.component.name());
            self.component.on_disable();
        }
    }

    /// Execute one cycle: `commands` sets the intents, then the component
    /// ticks once. Disabled components are not ticked.
    ///
    /// # Errors
    /// A tick error disables the component and is returned unchanged.
    pub fn step<F>(&mut self, commands: F) -> Result<(), HalError>
    where
        F: FnOnce(&mut C),
    {
        let cycle_start = Instant::now();

        if self.enabled {
            commands(&mut self.component);
            if let Err(e) = self.component.tick() {
                error!("'{}' tick failed: {}", self.component.name(), e);
                self.disable();
                return Err(e);
            }
        }

        let cycle_time_us = cycle_start.elapsed().as_micros() as u64;
        let target_us = self.cycle_time.as_micros() as u64;
        if self.stats.record(cycle_time_us, target_us) {
            let violations = self.stats.timing_violations;
            if violations <= 10 || violations % 1000 == 0 {
                warn!(
                    "Timing violation #{}: cycle took {}us (target {}us)",
                    violations, cycle_time_us, target_us
                );
            }
        }
        Ok(())
    }

    /// Run cycles until the running flag is cleared, `max_cycles` is
    /// reached, or a tick fails.
    ///
    /// The flag starts set and is never raised again here, so a shutdown
    /// requested before or during startup is honored. Once cleared, later
    /// calls return without ticking.
    ///
    /// `commands` is called before every tick with the cycle index.
    /// `on_cycle_end` is called after every cycle for observation.
    pub fn run<F, G>(
        &mut self,
        max_cycles: Option<u64>,
        mut commands: F,
        mut on_cycle_end: G,
    ) -> Result<(), HalError>
    where
        F: FnMut(u64, &mut C),
        G: FnMut(u64, &C),
    {
        self.init()?;
        self.enable()?;

        info!(
            "Starting control loop (cycle_time={}us, {} mode)...",
            self.cycle_time.as_micros(),
            if detect_rt_mode() { "real-time" } else { "standard" }
        );

        let mut cycle: u64 = 0;
        let result = loop {
            if !self.running.load(Ordering::SeqCst) {
                break Ok(());
            }
            if max_cycles.is_some_and(|max| cycle >= max) {
                break Ok(());
            }

            let cycle_start = Instant::now();
            if let Err(e) = self.step(|c| commands(cycle, c)) {
                break Err(e);
            }
            on_cycle_end(cycle, &self.component);
            cycle += 1;

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Loop: {} cycles, avg={}us, max={}us, violations={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle_time_us(),
                    self.stats.max_cycle_time_us,
                    self.stats.timing_violations
                );
            }

            let elapsed = cycle_start.elapsed();
            if elapsed < self.cycle_time {
                std::thread::sleep(self.cycle_time - elapsed);
            }
        };

        self.disable();
        info!(
            "Control loop stopped after {} cycles (violations: {})",
            self.stats.cycle_count, self.stats.timing_violations
        );
        result
    }

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> TimingStats {
        self.stats
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    /// Consume the runner, returning the component.
    pub fn into_inner(self) -> C {
        self.component
    }
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: sched_getscheduler(0) only queries the calling thread.
        let policy = unsafe { sched_getscheduler(0) };
        policy == SCHED_FIFO || policy == SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
        fail_setup: bool,
        fail_on_tick: Option<u32>,
        ticks: u32,
        intent: i32,
    }

    impl Component for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn setup(&mut self) -> Result<(), HalError> {
            self.events.push("setup");
            if self.fail_setup {
                return Err(HalError::InitFailed("no bus".to_string()));
            }
            Ok(())
        }

        fn on_enable(&mut self) {
            self.events.push("enable");
        }

        fn on_disable(&mut self) {
            self.events.push("disable");
        }

        fn tick(&mut self) -> Result<(), HalError> {
            self.ticks += 1;
            self.events.push("tick");
            if self.fail_on_tick == Some(self.ticks) {
                return Err(HalError::CommunicationError("timeout".to_string()));
            }
            Ok(())
        }
    }

    fn runner(recorder: Recorder) -> CycleRunner<Recorder> {
        CycleRunner::new(recorder, Duration::from_millis(1))
    }

    #[test]
    fn test_enable_requires_init() {
        let mut r = runner(Recorder::default());
        assert!(matches!(r.enable(), Err(HalError::InitFailed(_))));
        r.init().unwrap();
        r.enable().unwrap();
        assert!(r.is_enabled());
    }

    #[test]
    fn test_init_error_propagates() {
        let mut r = runner(Recorder {
            fail_setup: true,
            ..Recorder::default()
        });
        assert!(r.init().is_err());
        assert!(r.enable().is_err());
    }

    #[test]
    fn test_step_sets_intents_before_tick() {
        let mut r = runner(Recorder::default());
        r.init().unwrap();
        r.enable().unwrap();

        r.step(|c| {
            c.intent = 7;
            c.events.push("intent");
        })
        .unwrap();

        let c = r.component();
        assert_eq!(c.intent, 7);
        assert_eq!(c.events, vec!["setup", "enable", "intent", "tick"]);
        assert_eq!(r.stats().cycle_count, 1);
    }

    #[test]
    fn test_disabled_component_is_not_ticked() {
        let mut r = runner(Recorder::default());
        r.init().unwrap();
        r.step(|c| c.intent = 1).unwrap();

        assert_eq!(r.component().ticks, 0);
        assert_eq!(r.component().intent, 0);
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let mut r = runner(Recorder::default());
        r.init().unwrap();
        r.init().unwrap();
        r.enable().unwrap();
        r.enable().unwrap();
        r.disable();
        r.disable();

        assert_eq!(r.component().events, vec!["setup", "enable", "disable"]);
    }

    #[test]
    fn test_tick_error_disables_and_propagates() {
        let mut r = runner(Recorder {
            fail_on_tick: Some(1),
            ..Recorder::default()
        });
        r.init().unwrap();
        r.enable().unwrap();

        let result = r.step(|_| {});
        assert!(matches!(result, Err(HalError::CommunicationError(_))));
        assert!(!r.is_enabled());
        assert_eq!(r.component().events.last(), Some(&"disable"));
    }

    #[test]
    fn test_run_stops_after_max_cycles() {
        let mut r = runner(Recorder::default());
        let mut observed = Vec::new();

        r.run(Some(3), |i, c| c.intent = i as i32, |i, _| observed.push(i))
            .unwrap();

        assert_eq!(r.component().ticks, 3);
        assert_eq!(r.component().intent, 2);
        assert_eq!(observed, vec![0, 1, 2]);
        assert!(!r.is_enabled());
        assert_eq!(r.stats().cycle_count, 3);
    }

    #[test]
    fn test_run_returns_tick_error() {
        let mut r = runner(Recorder {
            fail_on_tick: Some(2),
            ..Recorder::default()
        });

        let result = r.run(Some(10), |_, _| {}, |_, _| {});
        assert!(result.is_err());
        assert_eq!(r.component().ticks, 2);
    }

    #[test]
    fn test_run_honors_cleared_running_flag() {
        let mut r = runner(Recorder::default());
        let flag = r.running_flag();

        r.run(
            None,
            |_, _| {},
            |i, _| {
                if i == 4 {
                    flag.store(false, Ordering::SeqCst);
                }
            },
        )
        .unwrap();

        assert_eq!(r.component().ticks, 5);
    }

    #[test]
    fn test_shutdown_before_run_is_honored() {
        let mut r = runner(Recorder::default());
        r.running_flag().store(false, Ordering::SeqCst);

        r.run(None, |_, _| {}, |_, _| {}).unwrap();

        assert_eq!(r.component().ticks, 0);
        assert_eq!(r.component().events, vec!["setup", "enable", "disable"]);
    }

    #[test]
    fn test_timing_stats_average() {
        let mut stats = TimingStats::default();
        assert_eq!(stats.avg_cycle_time_us(), 0);
        assert!(!stats.record(100, 1000));
        assert!(stats.record(1500, 1000));
        assert_eq!(stats.avg_cycle_time_us(), 800);
        assert_eq!(stats.max_cycle_time_us, 1500);
        assert_eq!(stats.timing_violations, 1);
    }
}
