//! Lifecycle states for test units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`TestUnit`](crate::TestUnit).
///
/// States move along `Pending -> Running -> {Passed, Failed}`, plus the
/// `Pending -> Skipped` edge taken when a unit's gate did not fail. The only
/// way back to `Pending` is `reset()`; no external code mutates state
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Pending,
    Skipped,
    Running,
    Passed,
    Failed,
}

impl TestState {
    /// True once the unit has reached a terminal state for the current
    /// generation.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            TestState::Passed | TestState::Failed | TestState::Skipped
        )
    }

    /// Lowercase name, identical to the serialized form. Consumers use it as
    /// a rendering class.
    pub fn as_str(self) -> &'static str {
        match self {
            TestState::Pending => "pending",
            TestState::Skipped => "skipped",
            TestState::Running => "running",
            TestState::Passed => "passed",
            TestState::Failed => "failed",
        }
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_covers_exactly_the_terminal_states() {
        assert!(TestState::Passed.is_settled());
        assert!(TestState::Failed.is_settled());
        assert!(TestState::Skipped.is_settled());
        assert!(!TestState::Pending.is_settled());
        assert!(!TestState::Running.is_settled());
    }

    #[test]
    fn wire_names_match_display() {
        for state in [
            TestState::Pending,
            TestState::Skipped,
            TestState::Running,
            TestState::Passed,
            TestState::Failed,
        ] {
            let wire = serde_json::to_string(&state).unwrap();
            assert_eq!(wire, format!("\"{state}\""));
        }
    }
}
