//! The ordered test registry.

use serde::Serialize;

use crate::body::TestBody;
use crate::state::TestState;
use crate::unit::TestUnit;

/// One row of a status snapshot: everything a reporter needs to render a
/// unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitStatus {
    pub key: String,
    pub name: String,
    pub state: TestState,
    /// Failure text, present only while the unit is failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only, ordered collection of test units.
///
/// Registration order is both the execution order and the report order.
/// Units are registered once, up front; the runner and reporters only read.
/// A gate must already be registered when its dependent is, which also makes
/// gate cycles unconstructible through this API.
#[derive(Default)]
pub struct Registry {
    units: Vec<TestUnit>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit with a body and no gate.
    pub fn register(&mut self, name: impl Into<String>, body: TestBody) -> TestUnit {
        self.push(TestUnit::new(name, None, Some(body)))
    }

    /// Registers a unit that runs only if `gate` settles `Failed`; any other
    /// settlement of the gate skips this unit instead.
    pub fn register_gated(
        &mut self,
        name: impl Into<String>,
        gate: &TestUnit,
        body: TestBody,
    ) -> TestUnit {
        self.push(TestUnit::new(name, Some(gate.clone()), Some(body)))
    }

    /// Registers a unit without a body. Running it always fails, which makes
    /// a stub both a visible placeholder and an always-open gate for units
    /// registered against it.
    pub fn register_stub(&mut self, name: impl Into<String>) -> TestUnit {
        self.push(TestUnit::new(name, None, None))
    }

    /// Units in registration order.
    pub fn all(&self) -> &[TestUnit] {
        &self.units
    }

    /// Current `{key, name, state}` view of every unit, in report order.
    pub fn snapshot(&self) -> Vec<UnitStatus> {
        self.units
            .iter()
            .map(|unit| UnitStatus {
                key: unit.key().to_string(),
                name: unit.name().to_string(),
                state: unit.state(),
                error: unit.error().map(|error| error.to_string()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn push(&mut self, unit: TestUnit) -> TestUnit {
        self.units.push(unit.clone());
        unit
    }
}
