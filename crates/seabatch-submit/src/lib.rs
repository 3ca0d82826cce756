//! Batch script submission and dependency chaining for seabatch.

pub mod coordinator;
pub mod run;
pub mod runner;
pub mod write;

pub use coordinator::{Coordinator, SubmissionRecord};
pub use run::{RunOutcome, RunRequest, run};
pub use runner::{ProcessRunner, SubmitRunner};
pub use write::write_script;

use camino::Utf8PathBuf;
use seabatch_parsers::{CommandError, ConfirmationError};
use seabatch_script::ScriptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
}
