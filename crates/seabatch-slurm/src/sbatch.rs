//! Submission with `sbatch`.

use seabatch_parsers::{ConfirmationError, parse_dotted_job_id, parse_sentence_job_id};
use tracing::debug;

pub const SUBMIT_PROGRAM: &str = "sbatch";

/// `-d afterok:<job_id>`
pub fn dependency_args(job_id: &str) -> [String; 2] {
    ["-d".to_string(), format!("afterok:{job_id}")]
}

/// Job id from `sbatch` output.
///
/// `sbatch` answers `Submitted batch job <id>`; the dotted form is
/// accepted too for sites that wrap it.
pub fn parse_job_id(confirmation: &str) -> Result<String, ConfirmationError> {
    let job_id = parse_sentence_job_id(confirmation)
        .or_else(|| parse_dotted_job_id(confirmation))
        .ok_or_else(|| ConfirmationError::Unrecognized(confirmation.trim().to_string()))?;
    debug!("sbatch job id {} from {:?}", job_id, confirmation.trim());
    Ok(job_id)
}
