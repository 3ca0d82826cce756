//! The seam between dialect-neutral script building and the
//! scheduler-specific crates.

use camino::Utf8PathBuf;
use seabatch_parsers::{ConfirmationError, WallTime};

use crate::cluster::Dialect;
use crate::layout::ResourceLayout;

/// Billing account for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    /// Named in the run description
    Configured(String),
    /// Cluster or dialect default assumed in its absence
    Assumed(&'static str),
}

impl Account {
    pub fn name(&self) -> &str {
        match self {
            Account::Configured(name) => name,
            Account::Assumed(name) => name,
        }
    }
}

/// Dialect-neutral inputs for one directive block.
#[derive(Debug, Clone)]
pub struct DirectiveRequest<'a> {
    pub job_name: String,
    pub layout: &'a ResourceLayout,
    pub walltime: WallTime,
    pub email: &'a str,
    pub account: Option<Account>,
    /// Per-processor memory for core-count-oriented dialects
    pub pmem: &'static str,
    /// Emit the layout's hardware constraint
    pub constraint_directive: bool,
    pub stdout: Utf8PathBuf,
    pub stderr: Utf8PathBuf,
}

/// One batch scheduler dialect.
pub trait Scheduler: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Program that submits a batch script.
    fn submit_program(&self) -> &'static str;

    /// Prefix every directive line starts with.
    fn directive_prefix(&self) -> &'static str;

    /// Account used when neither the run description nor the cluster names one.
    fn default_account(&self) -> Option<&'static str>;

    fn render_directives(&self, request: &DirectiveRequest<'_>) -> String;

    /// Flag pair making a submission wait for `job_id` to succeed.
    fn dependency_args(&self, job_id: &str) -> [String; 2];

    /// Extract the job id from the submit program's confirmation.
    fn parse_job_id(&self, confirmation: &str) -> Result<String, ConfirmationError>;
}
