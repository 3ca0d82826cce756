//! Shared parsing utilities for batch scheduler input and output.
//!
//! This crate provides the parsing functions used by both
//! seabatch-slurm and seabatch-torque, plus the subprocess runner
//! used to talk to the scheduler's submit command.

pub mod command;
pub mod confirmation;
pub mod time;

pub use command::{CommandError, run_command};
pub use confirmation::{ConfirmationError, parse_dotted_job_id, parse_sentence_job_id};
pub use time::{WallTime, WallTimeError};

/// Filter helper for optional string fields.
/// Returns None if the string is empty or whitespace only.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
