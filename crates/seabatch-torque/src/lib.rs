//! TORQUE/PBS integration for seabatch.
//!
//! Render `#PBS` directive blocks and submit with `qsub`.

pub mod directives;
pub mod qsub;

use seabatch_core::{Dialect, DirectiveRequest, Scheduler};
use seabatch_parsers::ConfirmationError;

/// The TORQUE scheduler dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Torque;

impl Scheduler for Torque {
    fn dialect(&self) -> Dialect {
        Dialect::Torque
    }

    fn submit_program(&self) -> &'static str {
        qsub::SUBMIT_PROGRAM
    }

    fn directive_prefix(&self) -> &'static str {
        directives::PREFIX
    }

    fn default_account(&self) -> Option<&'static str> {
        None
    }

    fn render_directives(&self, request: &DirectiveRequest<'_>) -> String {
        directives::render(request)
    }

    fn dependency_args(&self, job_id: &str) -> [String; 2] {
        qsub::dependency_args(job_id)
    }

    fn parse_job_id(&self, confirmation: &str) -> Result<String, ConfirmationError> {
        qsub::parse_job_id(confirmation)
    }
}
