//! Handles all consumer-facing progress output.
//!
//! The runner hands every reporter the full ordered snapshot after each
//! scheduling step; what to render, diff, or serialize is the reporter's
//! business. The core prescribes no rendering technology.

use std::collections::HashMap;
use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::registry::UnitStatus;
use crate::state::TestState;

/// Consumer of suite progress.
pub trait Reporter {
    /// Called with the full ordered snapshot after every scheduling step.
    fn report(&mut self, snapshot: &[UnitStatus]);

    /// Called once, after the last unit has settled.
    fn suite_finished(&mut self, snapshot: &[UnitStatus]) {
        let _ = snapshot;
    }
}

/// Discards all snapshots. Useful when callers assert on unit states
/// directly.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _snapshot: &[UnitStatus]) {}
}

/// Live terminal reporter: one line per state change, then a closing summary.
pub struct ConsoleReporter {
    stdout: StandardStream,
    seen: HashMap<String, TestState>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            stdout: StandardStream::stdout(ColorChoice::Auto),
            seen: HashMap::new(),
        }
    }

    fn print_change(&mut self, row: &UnitStatus) {
        let (label, color) = match row.state {
            TestState::Pending => ("WAIT", Color::White),
            TestState::Running => ("RUN", Color::Cyan),
            TestState::Passed => ("PASS", Color::Green),
            TestState::Failed => ("FAIL", Color::Red),
            TestState::Skipped => ("SKIP", Color::Yellow),
        };
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.stdout, "{:>4}", label);
        let _ = self.stdout.reset();
        let _ = writeln!(self.stdout, " {} [{}]", row.name, row.key);
        if let Some(error) = &row.error {
            let _ = writeln!(self.stdout, "     {}", error);
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, snapshot: &[UnitStatus]) {
        for row in snapshot {
            if self.seen.get(&row.key) == Some(&row.state) {
                continue;
            }
            self.seen.insert(row.key.clone(), row.state);
            // Pending rows are the quiet baseline; only movement is printed.
            if row.state != TestState::Pending {
                self.print_change(row);
            }
        }
    }

    fn suite_finished(&mut self, snapshot: &[UnitStatus]) {
        let passed = snapshot
            .iter()
            .filter(|r| r.state == TestState::Passed)
            .count();
        let failed = snapshot
            .iter()
            .filter(|r| r.state == TestState::Failed)
            .count();
        let skipped = snapshot
            .iter()
            .filter(|r| r.state == TestState::Skipped)
            .count();
        let _ = writeln!(
            self.stdout,
            "\nSuite summary: total {}, passed {}, failed {}, skipped {}",
            snapshot.len(),
            passed,
            failed,
            skipped,
        );
    }
}

/// Machine-readable reporter: each snapshot becomes one JSON array line on
/// the sink, ready for a UI or pipeline consumer to tail.
pub struct JsonLinesReporter<W: Write> {
    sink: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn report(&mut self, snapshot: &[UnitStatus]) {
        match serde_json::to_string(snapshot) {
            Ok(line) => {
                let _ = writeln!(self.sink, "{line}");
            }
            Err(error) => {
                tracing::warn!(%error, "could not serialize status snapshot");
            }
        }
    }
}
