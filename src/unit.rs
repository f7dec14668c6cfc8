//! The test unit state machine.
//!
//! A unit owns its lifecycle state and the memoized handle to its most
//! recent run. Errors become state here: `run()` resolves for every outcome,
//! and the only way to learn that a unit failed is to inspect its state and
//! captured error. Dependents and the runner can therefore await a run
//! without any failure path of their own.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

use crate::body::{BodyOutcome, TestBody};
use crate::errors::HarnessError;
use crate::key::derive_key;
use crate::state::TestState;

/// Clonable handle to a unit's possibly in-flight run. All clones resolve to
/// the same settled state without re-executing the body.
pub type RunHandle = Shared<BoxFuture<'static, TestState>>;

/// A named, independently runnable check.
///
/// Handles are cheap to clone. The registry owns the units; a gate edge is
/// just a second, non-owning handle to the gating unit. Gates are a single
/// hop by design: a gate's own gate is consulted only when the gate itself
/// runs, never re-checked by the dependent.
#[derive(Clone)]
pub struct TestUnit {
    inner: Arc<UnitInner>,
}

struct UnitInner {
    name: String,
    key: String,
    dependency: Option<TestUnit>,
    body: Option<TestBody>,
    lifecycle: Mutex<Lifecycle>,
}

struct Lifecycle {
    state: TestState,
    captured_error: Option<Arc<anyhow::Error>>,
    cached_run: Option<RunHandle>,
    generation: u64,
}

impl TestUnit {
    pub(crate) fn new(
        name: impl Into<String>,
        dependency: Option<TestUnit>,
        body: Option<TestBody>,
    ) -> Self {
        let name = name.into();
        let key = derive_key(&name);
        Self {
            inner: Arc::new(UnitInner {
                name,
                key,
                dependency,
                body,
                lifecycle: Mutex::new(Lifecycle {
                    state: TestState::Pending,
                    captured_error: None,
                    cached_run: None,
                    generation: 0,
                }),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Stable short key derived from the name at construction.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TestState {
        self.lock().state
    }

    /// The failure captured by the most recent run, present only while the
    /// unit is failed.
    pub fn error(&self) -> Option<Arc<anyhow::Error>> {
        self.lock().captured_error.clone()
    }

    /// Runs the unit, memoizing the outcome.
    ///
    /// The first call of a generation spawns the unit's drive future onto the
    /// current Tokio runtime and caches a shared handle to it; every later
    /// call, whether the run is still in flight or long settled, gets a clone
    /// of the same handle. The body executes at most once per generation, and
    /// the handle always resolves: failures become `Failed` state, never an
    /// error.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn run(&self) -> RunHandle {
        let mut lifecycle = self.lock();
        if let Some(handle) = &lifecycle.cached_run {
            return handle.clone();
        }

        let generation = lifecycle.generation;
        let task = tokio::spawn(self.clone().drive(generation));
        // Weak capture: the cached handle lives inside the unit, so a strong
        // handle here would cycle and keep the unit alive forever.
        let weak = Arc::downgrade(&self.inner);
        let handle: RunHandle = async move {
            match task.await {
                Ok(state) => state,
                // The drive task itself died, which the per-body panic guard
                // should make unreachable. Recorded as a failure so the suite
                // keeps moving.
                Err(join_error) => {
                    if let Some(inner) = weak.upgrade() {
                        let unit = TestUnit { inner };
                        unit.fail_silently(generation, anyhow!("test run aborted: {join_error}"));
                    }
                    TestState::Failed
                }
            }
        }
        .boxed()
        .shared();
        lifecycle.cached_run = Some(handle.clone());
        handle
    }

    /// Returns the unit to `Pending` and discards the memoized outcome.
    ///
    /// Bumps the generation counter so a run still settling from before the
    /// reset cannot write its outcome into the new generation.
    pub fn reset(&self) {
        let mut lifecycle = self.lock();
        lifecycle.state = TestState::Pending;
        lifecycle.captured_error = None;
        lifecycle.cached_run = None;
        lifecycle.generation += 1;
    }

    async fn drive(self, generation: u64) -> TestState {
        if let Some(gate) = self.inner.dependency.clone() {
            let gate_state = gate.run().await;
            // Inverted gate: only a failed primary lets the fallback probe
            // run. A gate that passed, skipped, or had nothing to run means
            // there is nothing left to diagnose here.
            if gate_state != TestState::Failed {
                tracing::debug!(unit = %self.inner.name, gate = %gate.name(), "skipped, gate did not fail");
                self.transition(generation, TestState::Skipped, None);
                return TestState::Skipped;
            }
        }
        self.execute(generation).await
    }

    async fn execute(self, generation: u64) -> TestState {
        let Some(body) = &self.inner.body else {
            let error = anyhow::Error::new(HarnessError::MissingBody {
                name: self.inner.name.clone(),
            });
            return self.fail(generation, error);
        };

        self.transition(generation, TestState::Running, None);

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body.invoke())) {
            Ok(outcome) => outcome,
            Err(payload) => return self.fail(generation, panic_error(payload)),
        };
        let result = match outcome {
            BodyOutcome::Immediate(result) => result,
            BodyOutcome::Deferred(future) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(panic_error(payload)),
            },
        };

        match result {
            Ok(()) => {
                self.transition(generation, TestState::Passed, None);
                TestState::Passed
            }
            Err(error) => self.fail(generation, error),
        }
    }

    fn fail(&self, generation: u64, error: anyhow::Error) -> TestState {
        tracing::error!(unit = %self.inner.name, error = %error, "test failed");
        self.fail_silently(generation, error);
        TestState::Failed
    }

    fn fail_silently(&self, generation: u64, error: anyhow::Error) {
        self.transition(generation, TestState::Failed, Some(Arc::new(error)));
    }

    /// Applies a state change unless the unit was reset after the driving
    /// run began.
    fn transition(
        &self,
        generation: u64,
        state: TestState,
        error: Option<Arc<anyhow::Error>>,
    ) {
        let mut lifecycle = self.lock();
        if lifecycle.generation != generation {
            return;
        }
        lifecycle.state = state;
        lifecycle.captured_error = error;
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        // Lifecycle critical sections contain no panicking code, so a
        // poisoned lock still holds consistent data.
        self.inner
            .lifecycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn panic_error(payload: Box<dyn std::any::Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string());
    anyhow!("test body panicked: {message}")
}
