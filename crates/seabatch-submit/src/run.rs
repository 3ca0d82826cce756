//! Write a run's batch scripts and submit them.

use camino::{Utf8Path, Utf8PathBuf};
use seabatch_core::{ClusterProfile, ResultType, RunDescription};
use seabatch_script::{
    BATCH_SCRIPT_NAME, ScriptOptions, assemble_deflate_script, assemble_script, scheduler_for,
};
use std::fs;
use tracing::info;

use crate::SubmitError;
use crate::coordinator::{Coordinator, SubmissionRecord};
use crate::runner::SubmitRunner;
use crate::write::write_script;

/// Everything needed to write and submit one run.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub run_desc: &'a RunDescription,
    /// Run description file as the job should refer to it
    pub desc_file: &'a Utf8Path,
    pub results_dir: &'a Utf8Path,
    pub run_dir: &'a Utf8Path,
    pub cluster: &'a ClusterProfile,
    pub options: ScriptOptions,
    /// Write scripts but don't submit them
    pub no_submit: bool,
    /// Job the primary submission waits on
    pub wait_on: Option<&'a str>,
}

/// Submissions made for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub primary: SubmissionRecord,
    pub dependents: Vec<(ResultType, SubmissionRecord)>,
}

/// Assemble and write every script, then submit unless `no_submit`.
///
/// All scripts are assembled before any is written, and all are
/// written before anything is submitted. Returns `None` in no-submit
/// mode. A failed submission is not retried; written scripts stay in
/// the run directory.
pub async fn run<R: SubmitRunner>(
    request: &RunRequest<'_>,
    runner: &R,
) -> Result<Option<RunOutcome>, SubmitError> {
    let options = &request.options;
    let primary_script = assemble_script(
        request.run_desc,
        request.desc_file,
        options,
        request.results_dir,
        request.run_dir,
        request.cluster,
    )?;
    let mut deflate_scripts = Vec::new();
    if options.separate_deflate {
        for result_type in ResultType::ALL {
            let script = assemble_deflate_script(
                request.run_desc,
                result_type,
                request.results_dir,
                request.cluster,
                options.use_alt_partition,
            )?;
            deflate_scripts.push((result_type, script));
        }
    }

    let batch_file = write_script(request.run_dir, BATCH_SCRIPT_NAME, &primary_script)?;
    let deflate_files = deflate_scripts
        .iter()
        .map(|(result_type, script)| {
            write_script(request.run_dir, &result_type.script_name(), script)
                .map(|path| (*result_type, path))
        })
        .collect::<Result<Vec<(ResultType, Utf8PathBuf)>, _>>()?;

    if request.no_submit {
        info!("Batch script(s) written to {}; not submitting", request.run_dir);
        return Ok(None);
    }

    fs::create_dir_all(request.results_dir).map_err(|source| SubmitError::Io {
        path: request.results_dir.to_owned(),
        source,
    })?;

    let coordinator = Coordinator::new(
        runner,
        scheduler_for(request.cluster.dialect),
        request.run_dir,
    );
    let primary = coordinator.submit(&batch_file, request.wait_on).await?;
    let mut dependents = Vec::with_capacity(deflate_files.len());
    for (result_type, path) in &deflate_files {
        let record = coordinator.submit_dependent(path, &primary.job_id).await?;
        dependents.push((*result_type, record));
    }

    Ok(Some(RunOutcome {
        primary,
        dependents,
    }))
}
