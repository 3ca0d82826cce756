//! Seabatch - batch jobs for Salish Sea NEMO runs on HPC clusters.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use seabatch_cli::{Args, Command, PrepareArgs, RunArgs, SplitArgs};
use seabatch_core::{ClusterId, RunDescription};
use seabatch_script::ScriptOptions;
use seabatch_submit::{ProcessRunner, RunRequest};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.command.quiet());

    match args.command {
        Command::Run(run) => run_command(run).await,
        Command::Prepare(prepare) => prepare_command(prepare),
        Command::SplitResults(split) => split_command(split),
    }
}

/// `RUST_LOG` wins; otherwise info, or warn when quiet.
fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cluster_id(name: Option<String>) -> ClusterId {
    let cluster = name.map(ClusterId::new).unwrap_or_else(ClusterId::detect);
    debug!("building for cluster {}", cluster);
    cluster
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = std::path::absolute(path).into_diagnostic()?;
    Utf8PathBuf::try_from(path).into_diagnostic()
}

async fn run_command(args: RunArgs) -> Result<()> {
    let cluster = cluster_id(args.cluster).profile();
    let run_desc = RunDescription::load(&args.desc_file).into_diagnostic()?;
    run_desc.validate().into_diagnostic()?;
    let prepared = seabatch_prepare::prepare(&run_desc, &args.desc_file).into_diagnostic()?;
    let results_dir = absolute(&args.results_dir)?;
    let desc_file = prepared
        .desc_file
        .file_name()
        .map(Utf8Path::new)
        .unwrap_or(&prepared.desc_file);

    let options = ScriptOptions {
        nemo_processors: run_desc.nemo_processors().into_diagnostic()?,
        xios_processors: run_desc.xios_processors().into_diagnostic()?,
        max_deflate_jobs: args.max_deflate_jobs,
        deflate: !args.no_deflate,
        separate_deflate: args.separate_deflate,
        use_alt_partition: args.cedar_broadwell,
    };
    let request = RunRequest {
        run_desc: &run_desc,
        desc_file,
        results_dir: &results_dir,
        run_dir: &prepared.run_dir,
        cluster,
        options,
        no_submit: args.no_submit,
        wait_on: args.waitjob.as_deref(),
    };

    match seabatch_submit::run(&request, &ProcessRunner)
        .await
        .into_diagnostic()?
    {
        Some(outcome) => {
            info!("{}", outcome.primary.confirmation);
            for (result_type, record) in &outcome.dependents {
                debug!("{} deflate job {}", result_type, record.job_id);
            }
        }
        None => println!("{}", prepared.run_dir),
    }
    Ok(())
}

fn prepare_command(args: PrepareArgs) -> Result<()> {
    let run_desc = RunDescription::load(&args.desc_file).into_diagnostic()?;
    let prepared = seabatch_prepare::prepare(&run_desc, &args.desc_file).into_diagnostic()?;
    println!("{}", prepared.run_dir);
    Ok(())
}

fn split_command(args: SplitArgs) -> Result<()> {
    let summary = seabatch_split::split_results(&args.results_dir, args.quiet).into_diagnostic()?;
    if let Some(last_date) = summary.last_date {
        info!(
            "Split {} results file(s) from {} through {}",
            summary.moved, args.results_dir, last_date
        );
    }
    Ok(())
}
