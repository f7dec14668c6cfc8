//! Executable check bodies.
//!
//! A body is a zero-argument operation that either settles on the spot or
//! hands back a deferred-completion handle. The split is explicit rather than
//! duck-typed: the unit normalizes both shapes into a single suspension
//! point.

use std::fmt;
use std::future::Future;

use anyhow::Result;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// What one body invocation hands back.
pub enum BodyOutcome {
    /// The check finished synchronously.
    Immediate(Result<()>),
    /// The check is still under way; the unit suspends until the future
    /// settles. Human-in-the-loop checks live here, so settlement may take
    /// arbitrarily long.
    Deferred(BoxFuture<'static, Result<()>>),
}

/// An executable check. A unit invokes its body at most once per generation;
/// the closure must therefore stay invocable across `reset()`/re-run cycles.
pub struct TestBody {
    f: Box<dyn Fn() -> BodyOutcome + Send + Sync>,
}

impl TestBody {
    /// Body that settles synchronously.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            f: Box::new(move || BodyOutcome::Immediate(f())),
        }
    }

    /// Body that settles through a future, e.g. one waiting on a timer or an
    /// operator confirmation.
    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            f: Box::new(move || BodyOutcome::Deferred(f().boxed())),
        }
    }

    pub(crate) fn invoke(&self) -> BodyOutcome {
        (self.f)()
    }
}

impl fmt::Debug for TestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TestBody")
    }
}
