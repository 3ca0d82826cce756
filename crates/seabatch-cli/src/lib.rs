//! CLI argument parsing for seabatch.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "seabatch")]
#[command(about = "Prepare, submit, and tidy up ocean model runs on HPC clusters")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prepare a run directory, write its batch script(s), and submit them
    Run(RunArgs),
    /// Prepare a run directory only
    Prepare(PrepareArgs),
    /// Split a multi-day results directory into per-day directories
    SplitResults(SplitArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Run(args) => args.quiet,
            Command::Prepare(args) => args.quiet,
            Command::SplitResults(args) => args.quiet,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Run description YAML file
    pub desc_file: Utf8PathBuf,

    /// Directory to store results in
    pub results_dir: Utf8PathBuf,

    /// Maximum number of concurrent results deflation processes
    #[arg(long, default_value = "4")]
    pub max_deflate_jobs: u32,

    /// Don't deflate the run results
    #[arg(long)]
    pub no_deflate: bool,

    /// Deflate results in separate jobs that depend on the run job
    #[arg(long, conflicts_with = "no_deflate")]
    pub separate_deflate: bool,

    /// Use broadwell nodes on cedar
    #[arg(long)]
    pub cedar_broadwell: bool,

    /// Prepare the run directory and write the script(s) without submitting
    #[arg(long)]
    pub no_submit: bool,

    /// Job id the run should wait on before it starts
    #[arg(long)]
    pub waitjob: Option<String>,

    /// Cluster to build scripts for instead of the detected one
    #[arg(long)]
    pub cluster: Option<String>,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct PrepareArgs {
    /// Run description YAML file
    pub desc_file: Utf8PathBuf,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct SplitArgs {
    /// Multi-day results directory, named ddmmmyy (e.g. 01jan07)
    pub results_dir: Utf8PathBuf,

    /// Don't report each file move
    #[arg(short, long)]
    pub quiet: bool,
}
