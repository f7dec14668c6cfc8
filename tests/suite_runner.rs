//! Suite scheduling: ordering, resilience, reporting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use litmus::{
    derive_key, run_suite, JsonLinesReporter, NullReporter, Registry, Reporter, RunnerConfig,
    TestBody, TestState, UnitStatus,
};
use pretty_assertions::assert_eq;

fn fast() -> RunnerConfig {
    RunnerConfig {
        inter_test_delay: Duration::from_millis(1),
    }
}

#[derive(Default)]
struct RecordingReporter {
    snapshots: Vec<Vec<UnitStatus>>,
    finished: bool,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, snapshot: &[UnitStatus]) {
        self.snapshots.push(snapshot.to_vec());
    }

    fn suite_finished(&mut self, _snapshot: &[UnitStatus]) {
        self.finished = true;
    }
}

#[tokio::test]
async fn a_failing_unit_does_not_abort_the_suite() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();
    for (name, fails) in [("first", false), ("second", true), ("third", false)] {
        let order = Arc::clone(&order);
        registry.register(
            name,
            TestBody::sync(move || {
                order.lock().unwrap().push(name);
                if fails {
                    anyhow::bail!("{name} broke")
                }
                Ok(())
            }),
        );
    }

    let summary = run_suite(&registry, &mut NullReporter, &fast()).await;

    assert_eq!(order.lock().unwrap().as_slice(), ["first", "second", "third"]);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.has_failures());
}

#[tokio::test]
async fn a_failed_primary_unlocks_its_fallback() {
    let mut registry = Registry::new();
    let primary = registry.register("root", TestBody::sync(|| anyhow::bail!("always down")));
    let fallback = registry.register_gated("dependent", &primary, TestBody::sync(|| Ok(())));

    run_suite(&registry, &mut NullReporter, &fast()).await;

    assert_eq!(primary.state(), TestState::Failed);
    assert_eq!(fallback.state(), TestState::Passed);

    let names: Vec<_> = registry.snapshot().into_iter().map(|row| row.name).collect();
    assert_eq!(names, ["root", "dependent"]);
}

#[tokio::test]
async fn a_healthy_primary_skips_its_fallback() {
    let mut registry = Registry::new();
    let primary = registry.register("root", TestBody::sync(|| Ok(())));
    let fallback = registry.register_gated("dependent", &primary, TestBody::sync(|| Ok(())));

    let summary = run_suite(&registry, &mut NullReporter, &fast()).await;

    assert_eq!(primary.state(), TestState::Passed);
    assert_eq!(fallback.state(), TestState::Skipped);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn snapshots_start_pending_and_end_settled() {
    let mut registry = Registry::new();
    registry.register(
        "one",
        TestBody::async_fn(|| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        }),
    );
    registry.register("two", TestBody::sync(|| anyhow::bail!("down")));

    let mut reporter = RecordingReporter::default();
    run_suite(&registry, &mut reporter, &fast()).await;

    assert!(reporter.finished);
    // Initial snapshot, two per unit while running and after settling.
    assert_eq!(reporter.snapshots.len(), 5);

    let first = &reporter.snapshots[0];
    assert!(first.iter().all(|row| row.state == TestState::Pending));

    // The first unit's body suspends, so the mid-run snapshot catches it
    // running.
    assert_eq!(reporter.snapshots[1][0].state, TestState::Running);

    let last = reporter.snapshots.last().unwrap();
    assert_eq!(last[0].state, TestState::Passed);
    assert_eq!(last[1].state, TestState::Failed);
    assert_eq!(last[0].key, derive_key("one"));
    assert!(last[1].error.as_deref().unwrap().contains("down"));
}

#[tokio::test]
async fn rerunning_a_suite_resets_the_previous_generation() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    let body_hits = Arc::clone(&hits);
    registry.register(
        "rerun",
        TestBody::sync(move || {
            body_hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    let first = run_suite(&registry, &mut NullReporter, &fast()).await;
    let second = run_suite(&registry, &mut NullReporter, &fast()).await;

    assert_eq!(first, second);
    assert_eq!(first.passed, 1);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn an_empty_registry_completes_immediately() {
    let registry = Registry::new();
    let mut reporter = RecordingReporter::default();

    let summary = run_suite(&registry, &mut reporter, &fast()).await;

    assert!(reporter.finished);
    assert_eq!(summary.total, 0);
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn json_reporter_emits_one_line_per_snapshot() {
    let mut registry = Registry::new();
    registry.register("only", TestBody::sync(|| Ok(())));

    let mut reporter = JsonLinesReporter::new(Vec::new());
    run_suite(&registry, &mut reporter, &fast()).await;

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.last().unwrap().contains("\"passed\""));
    assert!(lines[0].contains("\"pending\""));
}
