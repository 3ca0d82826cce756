//! Directive rules shared by both dialects: job naming, walltime,
//! account and email fallbacks, and stdout/stderr paths.

use camino::Utf8Path;
use seabatch_core::{
    Account, ClusterProfile, DirectiveRequest, ResourceLayout, ResultType, RunDescription,
    Scheduler,
};
use tracing::info;

use crate::ScriptError;
use crate::dialect::scheduler_for;

/// Domain for synthesized addresses in primary run scripts.
pub const PRIMARY_EMAIL_DOMAIN: &str = "eos.ubc.ca";

/// Domain for synthesized addresses in dependent deflate scripts.
/// Not the same as [`PRIMARY_EMAIL_DOMAIN`].
pub const DEFLATE_EMAIL_DOMAIN: &str = "eoas.ubc.ca";

/// Per-processor memory for a primary TORQUE job.
const PRIMARY_PMEM: &str = "2000mb";

/// Which job a directive block is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Primary,
    Deflate(ResultType),
}

impl JobKind {
    pub fn job_name(&self, run_id: &str) -> String {
        match self {
            JobKind::Primary => run_id.to_string(),
            JobKind::Deflate(result_type) => format!("{result_type}_{run_id}_deflate"),
        }
    }

    fn stream_name(&self, stream: &str) -> String {
        match self {
            JobKind::Primary => stream.to_string(),
            JobKind::Deflate(result_type) => format!("{stream}_deflate_{result_type}"),
        }
    }

    fn pmem(&self) -> &'static str {
        match self {
            JobKind::Primary => PRIMARY_PMEM,
            JobKind::Deflate(result_type) => result_type.pmem(),
        }
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Email from the run description, or `$USER@domain`.
pub fn resolve_email(run_desc: &RunDescription, domain: &str) -> String {
    match run_desc.email() {
        Some(email) => email,
        None => {
            let email = format!("{}@{}", current_user(), domain);
            info!(
                "No email found in run description YAML file, so assuming {}",
                email
            );
            email
        }
    }
}

/// Account from the run description, else the cluster's default,
/// else the dialect's default.
pub fn resolve_account(
    run_desc: &RunDescription,
    cluster: &ClusterProfile,
    scheduler: &dyn Scheduler,
) -> Option<Account> {
    if let Some(account) = run_desc.account() {
        return Some(Account::Configured(account));
    }
    let assumed = cluster
        .default_account
        .or_else(|| scheduler.default_account())?;
    info!(
        "No account found in run description YAML file, so assuming {}. If {} complains you can \
         specify a different account with a YAML line like account: def-allen",
        assumed,
        scheduler.submit_program()
    );
    Some(Account::Assumed(assumed))
}

/// Render the directive block for a job on `cluster`.
pub fn render_directives(
    run_desc: &RunDescription,
    cluster: &ClusterProfile,
    layout: &ResourceLayout,
    email: &str,
    results_dir: &Utf8Path,
    job: JobKind,
) -> Result<String, ScriptError> {
    let scheduler = scheduler_for(cluster.dialect);
    let request = DirectiveRequest {
        job_name: job.job_name(&run_desc.run_id()?),
        layout,
        walltime: run_desc.walltime()?,
        email,
        account: resolve_account(run_desc, cluster, scheduler),
        pmem: job.pmem(),
        constraint_directive: cluster.constraint_directive,
        stdout: results_dir.join(job.stream_name("stdout")),
        stderr: results_dir.join(job.stream_name("stderr")),
    };
    Ok(scheduler.render_directives(&request))
}
