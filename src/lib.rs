//! Litmus: a human-paced diagnostic suite harness.
//!
//! A suite is an ordered registry of named checks. Each check owns its own
//! lifecycle state, memoizes its outcome so re-entrant runs never repeat
//! work, and may be gated on another check: the gated check runs only when
//! its gate *failed*, modeling "probe the fallback path only if the primary
//! path did not already work". The runner walks the registry sequentially
//! with a fixed pause between checks and never aborts on a failure.

pub use crate::body::{BodyOutcome, TestBody};
pub use crate::errors::HarnessError;
pub use crate::key::derive_key;
pub use crate::registry::{Registry, UnitStatus};
pub use crate::report::{ConsoleReporter, JsonLinesReporter, NullReporter, Reporter};
pub use crate::runner::{run_suite, RunnerConfig, SuiteSummary};
pub use crate::state::TestState;
pub use crate::unit::{RunHandle, TestUnit};

pub mod body;
pub mod errors;
pub mod key;
pub mod registry;
pub mod report;
pub mod runner;
pub mod state;
pub mod unit;
