//! Atomic batch script writes.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use tracing::debug;

use crate::SubmitError;

/// Write `contents` to `dir/name` via a temp file and rename.
///
/// The temp file is removed if anything fails before the rename, so
/// `dir/name` is either absent, the previous script, or complete.
pub fn write_script(dir: &Utf8Path, name: &str, contents: &str) -> Result<Utf8PathBuf, SubmitError> {
    let path = dir.join(name);
    let io_err = |source| SubmitError::Io {
        path: path.clone(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(contents.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    fs::set_permissions(tmp.path(), Permissions::from_mode(0o755)).map_err(io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    debug!("wrote {}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_script() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let path = write_script(dir, "SalishSeaNEMO.sh", "#!/bin/bash\n").unwrap();

        assert_eq!(path, dir.join("SalishSeaNEMO.sh"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/bash\n");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        let entries: Vec<_> = fs::read_dir(dir).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file left behind");
    }

    #[test]
    fn test_write_script_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        write_script(dir, "deflate_grid.sh", "old\n").unwrap();
        let path = write_script(dir, "deflate_grid.sh", "new\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
    }

    #[test]
    fn test_write_script_missing_dir() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap().join("absent");
        let err = write_script(&dir, "SalishSeaNEMO.sh", "x").unwrap_err();
        assert!(matches!(err, SubmitError::Io { .. }));
        assert!(!dir.exists());
    }
}
