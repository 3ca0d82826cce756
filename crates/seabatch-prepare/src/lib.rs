//! Run directory preparation for seabatch.
//!
//! A run directory holds a copy of the run description and symlinks to
//! the executables the batch script launches.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use seabatch_core::{RunDescError, RunDescription};
use std::fs;
use std::os::unix::fs::symlink;
use thiserror::Error;
use tracing::{debug, info};

const RUNS_DIRECTORY: &[&[&str]] = &[&["paths", "runs directory"], &["paths", "runs_directory"]];
const NEMO_EXECUTABLE: &[&str] = &["paths", "NEMO executable"];
const XIOS_EXECUTABLE: &[&str] = &["paths", "XIOS executable"];

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error(transparent)]
    RunDesc(#[from] RunDescError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Executable not found: {0}")]
    MissingExecutable(Utf8PathBuf),
}

/// A prepared run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRun {
    pub run_dir: Utf8PathBuf,
    /// The run description copy inside `run_dir`
    pub desc_file: Utf8PathBuf,
}

fn io_error(path: &Utf8Path) -> impl Fn(std::io::Error) -> PrepareError + '_ {
    move |source| PrepareError::Io {
        path: path.to_owned(),
        source,
    }
}

fn link_executable(target: &Utf8Path, run_dir: &Utf8Path, name: &str) -> Result<(), PrepareError> {
    if !target.is_file() {
        return Err(PrepareError::MissingExecutable(target.to_owned()));
    }
    let link = run_dir.join(name);
    symlink(target, &link).map_err(io_error(&link))?;
    debug!("linked {} -> {}", link, target);
    Ok(())
}

/// Prepare a run directory named for the run id and the current time.
pub fn prepare(run_desc: &RunDescription, desc_file: &Utf8Path) -> Result<PreparedRun, PrepareError> {
    prepare_at(run_desc, desc_file, Utc::now())
}

/// Prepare a run directory stamped with `now`.
pub fn prepare_at(
    run_desc: &RunDescription,
    desc_file: &Utf8Path,
    now: DateTime<Utc>,
) -> Result<PreparedRun, PrepareError> {
    let runs_dir = run_desc
        .get_first(RUNS_DIRECTORY)?
        .as_str()
        .map(Utf8PathBuf::from)
        .ok_or_else(|| RunDescError::InvalidValue {
            key: RUNS_DIRECTORY[0].join("."),
            value: "a non-string value".to_string(),
            expected: "a directory path",
        })?;
    let nemo_exe = Utf8PathBuf::from(run_desc.get_string(NEMO_EXECUTABLE)?);
    let xios_exe = if run_desc.xios_processors()? > 0 {
        Some(Utf8PathBuf::from(run_desc.get_string(XIOS_EXECUTABLE)?))
    } else {
        run_desc.get_optional_string(XIOS_EXECUTABLE).map(Utf8PathBuf::from)
    };

    let run_id = run_desc.run_id()?;
    let run_dir = runs_dir.join(format!("{}_{}", run_id, now.format("%Y-%m-%dT%H%M%S%.6fZ")));
    fs::create_dir_all(&run_dir).map_err(io_error(&run_dir))?;

    let file_name = desc_file.file_name().unwrap_or("run_desc.yaml");
    let desc_copy = run_dir.join(file_name);
    fs::copy(desc_file, &desc_copy).map_err(io_error(desc_file))?;

    link_executable(&nemo_exe, &run_dir, "nemo.exe")?;
    if let Some(xios_exe) = xios_exe {
        link_executable(&xios_exe, &run_dir, "xios_server.exe")?;
    }

    info!("Created run directory {}", run_dir);
    Ok(PreparedRun {
        run_dir,
        desc_file: desc_copy,
    })
}
