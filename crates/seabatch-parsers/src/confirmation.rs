//! Job-id extraction from scheduler submission confirmations.
//!
//! `qsub` prints a dotted identifier such as `43.orca2.ibb`, where the
//! first dot-delimited token is the job number. `sbatch` prints a
//! sentence, `Submitted batch job 43`, where the fourth word is the
//! job number.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error(
        "Unrecognized submission confirmation {0:?}; expected `<id>.<server>` or `Submitted batch job <id>`"
    )]
    Unrecognized(String),
}

fn numeric(token: &str) -> Option<String> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        Some(token.to_string())
    } else {
        None
    }
}

/// Parse a dotted confirmation (`43.orca2.ibb` -> `43`).
pub fn parse_dotted_job_id(confirmation: &str) -> Option<String> {
    let text = confirmation.trim();
    if text.split_whitespace().count() != 1 {
        return None;
    }
    let (job_id, _server) = text.split_once('.')?;
    numeric(job_id)
}

/// Parse a sentence confirmation (`Submitted batch job 43` -> `43`).
pub fn parse_sentence_job_id(confirmation: &str) -> Option<String> {
    confirmation.split_whitespace().nth(3).and_then(numeric)
}
