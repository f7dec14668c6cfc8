//! Harness error taxonomy.
//!
//! Only the failures the harness itself can produce live here; whatever a
//! user-supplied body raises stays an opaque [`anyhow::Error`]. Neither kind
//! ever escapes `run()` as an error: failures become `Failed` state plus a
//! captured error on the unit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The unit was registered without an executable body.
    #[error("'{name}' does not have a defined test")]
    MissingBody { name: String },
}
