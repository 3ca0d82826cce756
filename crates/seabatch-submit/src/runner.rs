//! Invocation of the scheduler's submit program.

use camino::Utf8Path;
use seabatch_parsers::{CommandError, run_command};
use std::future::Future;
use tokio::process::Command;

/// Runs a submit program and returns its confirmation text.
pub trait SubmitRunner {
    fn submit(
        &self,
        program: &str,
        args: &[String],
        cwd: &Utf8Path,
    ) -> impl Future<Output = Result<String, CommandError>>;
}

/// Runs the real `sbatch`/`qsub` as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl SubmitRunner for ProcessRunner {
    async fn submit(
        &self,
        program: &str,
        args: &[String],
        cwd: &Utf8Path,
    ) -> Result<String, CommandError> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        run_command(&mut cmd, program).await
    }
}
