//! Sequential-with-delay suite scheduler.
//!
//! Checks in this family are human-in-the-loop: a body may wait on an
//! operator before settling. The scheduler therefore runs strictly in
//! registration order, one unit at a time, pauses between units to keep a
//! human-visible cadence, and never aborts on a failure.

use std::time::Duration;

use tokio::time::sleep;

use crate::registry::Registry;
use crate::report::Reporter;
use crate::state::TestState;

/// Scheduling knobs.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Pause before each unit starts. Gives transient rendering a chance to
    /// settle between interactive steps; a tuning constant, not a
    /// correctness requirement.
    pub inter_test_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            inter_test_delay: Duration::from_millis(100),
        }
    }
}

/// Final per-state counts of a suite run. Derived from the unit states,
/// which remain the source of truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn tally(registry: &Registry) -> Self {
        let mut summary = Self {
            total: registry.len(),
            ..Self::default()
        };
        for unit in registry.all() {
            match unit.state() {
                TestState::Passed => summary.passed += 1,
                TestState::Failed => summary.failed += 1,
                TestState::Skipped => summary.skipped += 1,
                TestState::Pending | TestState::Running => {}
            }
        }
        summary
    }
}

/// Runs every registered unit in order, one at a time.
///
/// Resets all units first, clearing the previous generation's memoized
/// outcomes, then for each unit: waits the configured delay, starts the run,
/// and awaits settlement before moving on. Snapshots go to the reporter
/// before anything runs, while each unit is under way, and after each
/// settlement. Per-unit failures are already absorbed inside `run()`, so
/// nothing here can abort the sequence; completion is signaled through
/// [`Reporter::suite_finished`] once the last unit settles.
pub async fn run_suite(
    registry: &Registry,
    reporter: &mut dyn Reporter,
    config: &RunnerConfig,
) -> SuiteSummary {
    for unit in registry.all() {
        unit.reset();
    }
    reporter.report(&registry.snapshot());

    for unit in registry.all() {
        sleep(config.inter_test_delay).await;
        let settled = unit.run();
        // Let the freshly spawned drive advance so `Running` is observable
        // in this snapshot.
        tokio::task::yield_now().await;
        reporter.report(&registry.snapshot());
        settled.await;
        reporter.report(&registry.snapshot());
    }

    let summary = SuiteSummary::tally(registry);
    reporter.suite_finished(&registry.snapshot());
    summary
}
