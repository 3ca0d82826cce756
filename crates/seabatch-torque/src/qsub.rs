//! Submission with `qsub`.

use seabatch_parsers::{ConfirmationError, parse_dotted_job_id, parse_sentence_job_id};
use tracing::debug;

pub const SUBMIT_PROGRAM: &str = "qsub";

/// `-W depend=afterok:<job_id>`
pub fn dependency_args(job_id: &str) -> [String; 2] {
    ["-W".to_string(), format!("depend=afterok:{job_id}")]
}

/// Job id from `qsub` output such as `43.orca2.ibb`.
pub fn parse_job_id(confirmation: &str) -> Result<String, ConfirmationError> {
    let job_id = parse_dotted_job_id(confirmation)
        .or_else(|| parse_sentence_job_id(confirmation))
        .ok_or_else(|| ConfirmationError::Unrecognized(confirmation.trim().to_string()))?;
    debug!("qsub job id {} from {:?}", job_id, confirmation.trim());
    Ok(job_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_args() {
        assert_eq!(dependency_args("43"), ["-W", "depend=afterok:43"]);
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("43.orca2.ibb\n").unwrap(), "43");
        assert_eq!(parse_job_id("Submitted batch job 43").unwrap(), "43");
        assert!(matches!(
            parse_job_id("qsub: Job exceeds queue resource limits"),
            Err(ConfirmationError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_job_id("43"),
            Err(ConfirmationError::Unrecognized(_))
        ));
    }
}
