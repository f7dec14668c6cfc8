//! Demo suite: simulated playback probes with failure-gated fallbacks.
//!
//! Reconstructs the shape of an in-browser audio diagnostic page with timer
//! bodies instead of audio hardware: primaries that pass or fail, fallback
//! probes that only run when their primary failed, and a stub with no body.

use std::time::Duration;

use anyhow::bail;
use litmus::{run_suite, ConsoleReporter, Registry, RunnerConfig, TestBody};
use tokio::time::sleep;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let mut registry = Registry::new();

    registry.register("audio context", TestBody::sync(|| Ok(())));
    registry.register(
        "decode sample",
        TestBody::async_fn(|| async {
            sleep(Duration::from_millis(250)).await;
            Ok(())
        }),
    );

    let userless = registry.register(
        "user-less playback",
        TestBody::async_fn(|| async {
            sleep(Duration::from_millis(150)).await;
            bail!("did not play")
        }),
    );
    registry.register_gated(
        "user action playback",
        &userless,
        TestBody::async_fn(|| async {
            sleep(Duration::from_millis(200)).await;
            Ok(())
        }),
    );

    let second = registry.register(
        "second source playback",
        TestBody::async_fn(|| async {
            sleep(Duration::from_millis(100)).await;
            Ok(())
        }),
    );
    // Skipped at runtime: its gate passes.
    registry.register_gated("second source fallback", &second, TestBody::sync(|| Ok(())));

    registry.register_stub("sprite seek");
    registry.register("third-party shim", TestBody::sync(|| bail!("Howl not defined")));

    let mut reporter = ConsoleReporter::new();
    let summary = run_suite(&registry, &mut reporter, &RunnerConfig::default()).await;

    if summary.has_failures() {
        std::process::exit(1);
    }
}
