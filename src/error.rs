//! Run-level failures.
//!
//! A [`DeployError`] aborts the whole run before any deploy log is written.
//! Failures of a single requested item are never raised as errors; they are
//! recorded as `FAILED` rows instead (see [`crate::deploy_log`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration:\n  - {}", .0.join("\n  - "))]
    Precondition(Vec<String>),

    #[error("Authorization against '{env}' failed: {message}")]
    Authorization { env: String, message: String },

    #[error("Source folder '{0}' does not exist in the source environment")]
    UnknownSourceFolder(String),

    #[error("Export of folder '{folder_id}' failed: {message}")]
    Export { folder_id: String, message: String },
}

/// Process exit code for a failed run.
///
/// `1` when a [`DeployError`] is anywhere in the chain (a precondition of the
/// run was not met), `2` for everything else.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<DeployError>()) {
        1
    } else {
        2
    }
}
