//! Submission of batch scripts with optional dependencies.

use camino::Utf8Path;
use seabatch_core::Scheduler;
use tracing::{debug, info};

use crate::SubmitError;
use crate::runner::SubmitRunner;

/// The outcome of one successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub job_id: String,
    /// Submit program output, trimmed
    pub confirmation: String,
    /// Job this one waits on, if any
    pub depends_on: Option<String>,
}

/// Submits scripts from one run directory with one scheduler.
///
/// The scheduler, and so the submit program and dependency flag
/// syntax, is fixed for the coordinator's lifetime.
pub struct Coordinator<'a, R> {
    runner: &'a R,
    scheduler: &'static dyn Scheduler,
    run_dir: &'a Utf8Path,
}

impl<'a, R: SubmitRunner> Coordinator<'a, R> {
    pub fn new(runner: &'a R, scheduler: &'static dyn Scheduler, run_dir: &'a Utf8Path) -> Self {
        Self {
            runner,
            scheduler,
            run_dir,
        }
    }

    pub fn scheduler(&self) -> &'static dyn Scheduler {
        self.scheduler
    }

    /// Arguments after the program name: dependency pair, then script.
    pub fn submit_args(&self, script: &Utf8Path, wait_on: Option<&str>) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if let Some(job_id) = wait_on {
            args.extend(self.scheduler.dependency_args(job_id));
        }
        args.push(script.to_string());
        args
    }

    /// Submit `script`, optionally after `wait_on` succeeds.
    pub async fn submit(
        &self,
        script: &Utf8Path,
        wait_on: Option<&str>,
    ) -> Result<SubmissionRecord, SubmitError> {
        let program = self.scheduler.submit_program();
        let args = self.submit_args(script, wait_on);
        debug!("{} {}", program, args.join(" "));

        let output = self.runner.submit(program, &args, self.run_dir).await?;
        let job_id = self.scheduler.parse_job_id(&output)?;
        Ok(SubmissionRecord {
            job_id,
            confirmation: output.trim().to_string(),
            depends_on: wait_on.map(str::to_string),
        })
    }

    /// Submit `script` to start after `parent_job_id` succeeds.
    pub async fn submit_dependent(
        &self,
        script: &Utf8Path,
        parent_job_id: &str,
    ) -> Result<SubmissionRecord, SubmitError> {
        let record = self.submit(script, Some(parent_job_id)).await?;
        info!("{} is dependent on {}", record.confirmation, parent_job_id);
        Ok(record)
    }
}
