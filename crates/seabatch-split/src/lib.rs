//! Split a multi-day results directory into per-day directories.
//!
//! Each netCDF file is moved into a sibling directory named for the
//! date at the end of its name (`ddmmmyy`, e.g. `03jan07`) and renamed
//! so its start and end dates are that single day. Restart files move,
//! unrenamed, into the last day's directory.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

static DDMMMYY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}[A-Za-z]{3}\d{2}$").expect("ddmmmyy pattern is valid"));

/// Length of the `_YYYYMMDD-YYYYMMDD` suffix on results file stems.
const DATE_RANGE_SUFFIX_LEN: usize = 18;

/// Stem prefix of files renamed from fixed character offsets.
const HOURLY_PREFIX: &str = "SalishSea_1";
/// `SalishSea_1h_`
const HOURLY_HEAD_LEN: usize = 13;
/// Offset of the grid token in `SalishSea_1h_YYYYMMDD_YYYYMMDD_grid_T_...`
const HOURLY_GRID_OFFSET: usize = 31;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Results directory not found: {0}")]
    NotFound(Utf8PathBuf),
    #[error("Results path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),
    #[error("Results directory name is not ddmmmyy (e.g. 01jan07): {0}")]
    BadDirectoryName(Utf8PathBuf),
    #[error("Cannot get a YYYYMMDD date from the end of results file name: {0}")]
    UnrecognizedFilename(Utf8PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a split did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Dated results files moved
    pub moved: usize,
    /// Restart files moved
    pub restarts: usize,
    /// Latest date found
    pub last_date: Option<NaiveDate>,
}

fn io_error(path: &Utf8Path) -> impl Fn(std::io::Error) -> SplitError + '_ {
    move |source| SplitError::Io {
        path: path.to_owned(),
        source,
    }
}

/// Parse a `ddmmmyy` directory name such as `01jan07`.
pub fn parse_ddmmmyy(name: &str) -> Option<NaiveDate> {
    if !DDMMMYY.is_match(name) {
        return None;
    }
    NaiveDate::parse_from_str(name, "%d%b%y").ok()
}

/// Format a date as a lower-case `ddmmmyy` directory name.
pub fn format_ddmmmyy(date: NaiveDate) -> String {
    date.format("%d%b%y").to_string().to_lowercase()
}

/// Date from the last 8 characters of a file stem.
fn stem_date(stem: &str) -> Option<NaiveDate> {
    let tail = stem.get(stem.len().checked_sub(8)?..)?;
    if !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(tail, "%Y%m%d").ok()
}

/// Single-day file name for a results file stem.
fn single_day_name(stem: &str, date: NaiveDate) -> Option<String> {
    let range_start = stem.len().checked_sub(DATE_RANGE_SUFFIX_LEN)?;
    if stem.starts_with(HOURLY_PREFIX) {
        let ymd = date.format("%Y%m%d");
        let head = stem.get(..HOURLY_HEAD_LEN)?;
        let grid = stem.get(HOURLY_GRID_OFFSET..range_start)?;
        Some(format!("{head}{ymd}_{ymd}_{grid}.nc"))
    } else {
        let base = stem.get(..range_start).filter(|base| !base.is_empty())?;
        Some(format!("{base}.nc"))
    }
}

fn netcdf_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SplitError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
            warn!("Skipping non-UTF-8 file name {:?}", entry.path());
            continue;
        };
        if path.extension() == Some("nc") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_restart(path: &Utf8Path) -> bool {
    path.file_stem().is_some_and(|stem| stem.contains("restart"))
}

fn move_file(from: &Utf8Path, to: &Utf8Path, quiet: bool) -> Result<(), SplitError> {
    fs::rename(from, to).map_err(io_error(from))?;
    if !quiet {
        info!("Moved {} to {}", from, to);
    }
    Ok(())
}

/// Split `source_dir` into per-day sibling directories.
pub fn split_results(source_dir: &Utf8Path, quiet: bool) -> Result<SplitSummary, SplitError> {
    if !source_dir.exists() {
        return Err(SplitError::NotFound(source_dir.to_owned()));
    }
    if !source_dir.is_dir() {
        return Err(SplitError::NotADirectory(source_dir.to_owned()));
    }
    source_dir
        .file_name()
        .and_then(parse_ddmmmyy)
        .ok_or_else(|| SplitError::BadDirectoryName(source_dir.to_owned()))?;
    let parent = source_dir.parent().unwrap_or(Utf8Path::new(""));

    let (restarts, results): (Vec<_>, Vec<_>) =
        netcdf_files(source_dir)?.into_iter().partition(|p| is_restart(p));

    let mut summary = SplitSummary::default();
    for path in &results {
        let unrecognized = || SplitError::UnrecognizedFilename(path.clone());
        let stem = path.file_stem().ok_or_else(unrecognized)?;
        let date = stem_date(stem).ok_or_else(unrecognized)?;
        let file_name = single_day_name(stem, date).ok_or_else(unrecognized)?;

        let dest_dir = parent.join(format_ddmmmyy(date));
        fs::create_dir_all(&dest_dir).map_err(io_error(&dest_dir))?;
        move_file(path, &dest_dir.join(file_name), quiet)?;

        summary.moved += 1;
        summary.last_date = summary.last_date.max(Some(date));
    }

    match summary.last_date {
        Some(last_date) => {
            let dest_dir = parent.join(format_ddmmmyy(last_date));
            for path in &restarts {
                if let Some(name) = path.file_name() {
                    move_file(path, &dest_dir.join(name), quiet)?;
                    summary.restarts += 1;
                }
            }
        }
        None if !restarts.is_empty() => {
            warn!(
                "No dated results files in {}; leaving {} restart file(s) in place",
                source_dir,
                restarts.len()
            );
        }
        None => {}
    }

    Ok(summary)
}
