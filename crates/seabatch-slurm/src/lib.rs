//! SLURM integration for seabatch.
//!
//! Render `#SBATCH` directive blocks and submit with `sbatch`.

pub mod directives;
pub mod sbatch;

use seabatch_core::{Dialect, DirectiveRequest, Scheduler};
use seabatch_parsers::ConfirmationError;

/// The SLURM scheduler dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Slurm;

impl Scheduler for Slurm {
    fn dialect(&self) -> Dialect {
        Dialect::Slurm
    }

    fn submit_program(&self) -> &'static str {
        sbatch::SUBMIT_PROGRAM
    }

    fn directive_prefix(&self) -> &'static str {
        directives::PREFIX
    }

    fn default_account(&self) -> Option<&'static str> {
        Some(directives::DEFAULT_ACCOUNT)
    }

    fn render_directives(&self, request: &DirectiveRequest<'_>) -> String {
        directives::render(request)
    }

    fn dependency_args(&self, job_id: &str) -> [String; 2] {
        sbatch::dependency_args(job_id)
    }

    fn parse_job_id(&self, confirmation: &str) -> Result<String, ConfirmationError> {
        sbatch::parse_job_id(confirmation)
    }
}
