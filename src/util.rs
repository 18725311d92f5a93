//! Target-directory validation.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Result, anyhow};
#[cfg(unix)]
use tracing::warn;

/// Ensure the target directory exists and is writable, warning on unsafe
/// permissions.
pub fn ensure_target_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_dir() {
            return Err(anyhow!(
                "target path is not a directory: {}",
                path.display()
            ));
        }
    } else {
        std::fs::create_dir_all(path)?;
    }
    let metadata = std::fs::metadata(path)?;

    let probe_path = path.join(".diskfill_write_probe");
    match OpenOptions::new()
        .write(true)
        .create(true)
        .open(&probe_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe_path);
        }
        Err(err) => {
            return Err(anyhow!(
                "target directory is not writable: {} ({})",
                path.display(),
                err
            ));
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        if mode & 0o002 != 0 {
            warn!("target directory is world-writable: {}", path.display());
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_target_dir;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn accepts_writable_directory() {
        let dir = tempdir().expect("tempdir");
        ensure_target_dir(dir.path()).expect("ensure target dir");
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("fill");
        ensure_target_dir(&nested).expect("ensure target dir");
        assert!(nested.is_dir());
    }

    #[test]
    fn rejects_target_path_that_is_file() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("target.txt");
        let _ = File::create(&file_path).expect("create file");
        let err = ensure_target_dir(&file_path).expect_err("should fail");
        assert!(err.to_string().contains("not a directory"));
    }
}
