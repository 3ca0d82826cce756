//! Read-only access to a YAML run description.
//!
//! Keys are addressed by path, e.g. `&["output", "XIOS servers"]`.
//! A required lookup that misses is a [`RunDescError::MissingKey`]
//! naming the dotted path; optional lookups return `None` instead.

use camino::{Utf8Path, Utf8PathBuf};
use seabatch_parsers::{WallTime, WallTimeError, non_empty_string};
use serde_yaml::Value;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunDescError {
    #[error("Failed to read run description {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse run description YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Run description is not a YAML mapping")]
    NotAMapping,
    #[error("'{key}' key not found in YAML run description file")]
    MissingKey { key: String },
    #[error("Invalid value {value:?} for '{key}'; expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("Invalid 'walltime' in run description: {0}")]
    Walltime(#[from] WallTimeError),
}

const MPI_DECOMPOSITION: &[&[&str]] = &[&["MPI decomposition"], &["MPI_decomposition"]];
const SEPARATE_XIOS_SERVER: &[&[&str]] = &[
    &["output", "separate XIOS server"],
    &["output", "separate_xios_server"],
];
const XIOS_SERVERS: &[&[&str]] = &[&["output", "XIOS servers"], &["output", "xios_servers"]];

fn dotted(keys: &[&str]) -> String {
    keys.join(".")
}

/// Render a scalar YAML value as a string.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A loaded run description.
#[derive(Debug, Clone)]
pub struct RunDescription {
    root: Value,
}

impl RunDescription {
    /// Parse a run description from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RunDescError> {
        let root: Value = serde_yaml::from_str(yaml)?;
        if !root.is_mapping() {
            return Err(RunDescError::NotAMapping);
        }
        Ok(Self { root })
    }

    /// Load a run description file.
    pub fn load(path: &Utf8Path) -> Result<Self, RunDescError> {
        let content = fs::read_to_string(path).map_err(|source| RunDescError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Value at a key path, or `None` if any segment is absent.
    pub fn get_optional(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(&self.root, |node, key| node.get(*key))
    }

    /// Value at a key path; absence is an error.
    pub fn get(&self, keys: &[&str]) -> Result<&Value, RunDescError> {
        self.get_optional(keys)
            .ok_or_else(|| RunDescError::MissingKey { key: dotted(keys) })
    }

    /// First value found among alternative spellings of a key path.
    ///
    /// The error names the first (current) spelling.
    pub fn get_first(&self, alternatives: &[&[&str]]) -> Result<&Value, RunDescError> {
        alternatives
            .iter()
            .find_map(|keys| self.get_optional(keys))
            .ok_or_else(|| RunDescError::MissingKey {
                key: alternatives.first().map(|k| dotted(k)).unwrap_or_default(),
            })
    }

    /// Required scalar value rendered as a string.
    pub fn get_string(&self, keys: &[&str]) -> Result<String, RunDescError> {
        let value = self.get(keys)?;
        scalar_string(value).ok_or_else(|| RunDescError::InvalidValue {
            key: dotted(keys),
            value: format!("{value:?}"),
            expected: "a scalar",
        })
    }

    /// Optional, non-empty scalar value rendered as a string.
    pub fn get_optional_string(&self, keys: &[&str]) -> Option<String> {
        self.get_optional(keys)
            .and_then(scalar_string)
            .and_then(|s| non_empty_string(&s))
    }

    pub fn run_id(&self) -> Result<String, RunDescError> {
        self.get_string(&["run_id"])
    }

    /// Walltime from either integer seconds or an `H:MM:SS` string.
    pub fn walltime(&self) -> Result<WallTime, RunDescError> {
        match self.get(&["walltime"])? {
            Value::Number(n) => n.as_u64().map(WallTime::from_secs).ok_or_else(|| {
                RunDescError::Walltime(WallTimeError::Invalid(n.to_string()))
            }),
            Value::String(s) => Ok(s.parse()?),
            other => Err(RunDescError::Walltime(WallTimeError::Invalid(format!(
                "{other:?}"
            )))),
        }
    }

    pub fn email(&self) -> Option<String> {
        self.get_optional_string(&["email"])
    }

    pub fn account(&self) -> Option<String> {
        self.get_optional_string(&["account"])
    }

    /// MPI decomposition as `(i, j)` from an `"IxJ"` value.
    pub fn mpi_decomposition(&self) -> Result<(u32, u32), RunDescError> {
        let value = self.get_first(MPI_DECOMPOSITION)?;
        let raw = scalar_string(value).unwrap_or_default();
        let invalid = || RunDescError::InvalidValue {
            key: dotted(MPI_DECOMPOSITION[0]),
            value: raw.clone(),
            expected: "IxJ, e.g. 8x18",
        };
        let (i, j) = raw.split_once('x').ok_or_else(invalid)?;
        let i = i.trim().parse::<u32>().map_err(|_| invalid())?;
        let j = j.trim().parse::<u32>().map_err(|_| invalid())?;
        if i == 0 || j == 0 {
            return Err(invalid());
        }
        Ok((i, j))
    }

    /// Number of model processes implied by the MPI decomposition.
    pub fn nemo_processors(&self) -> Result<u32, RunDescError> {
        let (i, j) = self.mpi_decomposition()?;
        i.checked_mul(j).ok_or_else(|| RunDescError::InvalidValue {
            key: dotted(MPI_DECOMPOSITION[0]),
            value: format!("{i}x{j}"),
            expected: "a decomposition of at most 4294967295 processors",
        })
    }

    /// Number of I/O server processes, 0 unless a separate server is enabled.
    pub fn xios_processors(&self) -> Result<u32, RunDescError> {
        let separate = SEPARATE_XIOS_SERVER
            .iter()
            .find_map(|keys| self.get_optional(keys))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !separate {
            return Ok(0);
        }
        let value = self.get_first(XIOS_SERVERS)?;
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| RunDescError::InvalidValue {
                key: dotted(XIOS_SERVERS[0]),
                value: format!("{value:?}"),
                expected: "a non-negative integer",
            })
    }

    /// Check the values every batch script needs.
    pub fn validate(&self) -> Result<(), RunDescError> {
        self.run_id()?;
        self.walltime()?;
        self.nemo_processors()?;
        self.xios_processors()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_DESC: &str = r#"
config_name: SalishSea
run_id: 01jan07hindcast
walltime: "10:00:00"
MPI decomposition: 7x6
email: someone@example.com
output:
  separate XIOS server: true
  XIOS servers: 1
paths:
  runs directory: /scratch/runs
"#;

    #[test]
    fn test_required_and_optional_lookups() {
        let desc = RunDescription::from_yaml_str(RUN_DESC).unwrap();
        assert_eq!(desc.run_id().unwrap(), "01jan07hindcast");
        assert_eq!(
            desc.get_string(&["paths", "runs directory"]).unwrap(),
            "/scratch/runs"
        );
        assert!(desc.get_optional(&["paths", "forcing"]).is_none());
        assert_eq!(desc.account(), None);
        assert_eq!(desc.email().as_deref(), Some("someone@example.com"));
    }

    #[test]
    fn test_missing_key_names_dotted_path() {
        let desc = RunDescription::from_yaml_str(RUN_DESC).unwrap();
        let err = desc.get(&["paths", "forcing"]).unwrap_err();
        assert!(matches!(err, RunDescError::MissingKey { ref key } if key == "paths.forcing"));
        assert_eq!(
            err.to_string(),
            "'paths.forcing' key not found in YAML run description file"
        );
    }

    #[test]
    fn test_processor_counts() {
        let desc = RunDescription::from_yaml_str(RUN_DESC).unwrap();
        assert_eq!(desc.mpi_decomposition().unwrap(), (7, 6));
        assert_eq!(desc.nemo_processors().unwrap(), 42);
        assert_eq!(desc.xios_processors().unwrap(), 1);
    }

    #[test]
    fn test_alternate_key_spellings() {
        let desc = RunDescription::from_yaml_str(
            "run_id: x\nMPI_decomposition: 8x18\noutput:\n  separate_xios_server: true\n  xios_servers: 2\n",
        )
        .unwrap();
        assert_eq!(desc.nemo_processors().unwrap(), 144);
        assert_eq!(desc.xios_processors().unwrap(), 2);
    }

    #[test]
    fn test_no_separate_xios_server() {
        let desc =
            RunDescription::from_yaml_str("MPI decomposition: 2x2\noutput:\n  XIOS servers: 3\n")
                .unwrap();
        assert_eq!(desc.xios_processors().unwrap(), 0);
    }

    #[test]
    fn test_validate() {
        RunDescription::from_yaml_str(RUN_DESC).unwrap().validate().unwrap();

        let bad_walltime = RUN_DESC.replace("\"10:00:00\"", "\"10:61:00\"");
        assert!(matches!(
            RunDescription::from_yaml_str(&bad_walltime).unwrap().validate(),
            Err(RunDescError::Walltime(_))
        ));

        let no_run_id = RUN_DESC.replace("run_id: 01jan07hindcast\n", "");
        assert!(matches!(
            RunDescription::from_yaml_str(&no_run_id).unwrap().validate(),
            Err(RunDescError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_overflowing_decomposition() {
        let desc = RunDescription::from_yaml_str("MPI decomposition: 100000x100000\n").unwrap();
        match desc.nemo_processors() {
            Err(RunDescError::InvalidValue { key, value, .. }) => {
                assert_eq!(key, "MPI decomposition");
                assert_eq!(value, "100000x100000");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_decomposition() {
        let desc = RunDescription::from_yaml_str("MPI decomposition: 8by18\n").unwrap();
        assert!(matches!(
            desc.mpi_decomposition(),
            Err(RunDescError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_walltime_forms() {
        let secs = RunDescription::from_yaml_str("walltime: 3723\n").unwrap();
        assert_eq!(secs.walltime().unwrap().to_string(), "1:02:03");
        let hms = RunDescription::from_yaml_str("walltime: '1:02:03'\n").unwrap();
        assert_eq!(hms.walltime().unwrap().to_string(), "1:02:03");
        let bad = RunDescription::from_yaml_str("walltime: tomorrow\n").unwrap();
        assert!(matches!(bad.walltime(), Err(RunDescError::Walltime(_))));
        let missing = RunDescription::from_yaml_str("run_id: x\n").unwrap();
        assert!(matches!(
            missing.walltime(),
            Err(RunDescError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_not_a_mapping() {
        assert!(matches!(
            RunDescription::from_yaml_str("- a\n- b\n"),
            Err(RunDescError::NotAMapping)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("run.yaml");
        fs::write(&path, RUN_DESC).unwrap();
        let desc = RunDescription::load(&path).unwrap();
        assert_eq!(desc.run_id().unwrap(), "01jan07hindcast");

        let missing = RunDescription::load(&path.with_file_name("nope.yaml"));
        assert!(matches!(missing, Err(RunDescError::Io { .. })));
    }
}
