//! Launch script persistence.
//!
//! # Responsibilities
//! - Write the launch script the external supervisor executes
//! - Skip the write when the on-disk content already matches
//! - Stamp executable permissions so the supervisor can run it directly
//!
//! # Design Decisions
//! - Failures are logged and reported as `false`, never propagated: a failed
//!   write becomes a retry on the next reconciliation tick

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// Mode for the launch script: owner rwx, group and other rx.
const SCRIPT_MODE: u32 = 0o755;

/// Write `command` to `path`, returning true when the script on disk
/// reflects `command` afterwards.
///
/// An existing script with identical content is left untouched, so the
/// supervisor observes no modification and the running process is not
/// restarted needlessly.
pub fn write_launch_script(command: &str, path: &Path) -> bool {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == command {
            tracing::info!(path = %path.display(), "Mirror command is unchanged");
            return true;
        }
    }

    tracing::info!(path = %path.display(), command, "Writing new mirror command");
    match write_script(command, path) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Attempt to update mirror command failed!");
            false
        }
    }
}

fn write_script(command: &str, path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(SCRIPT_MODE)
        .open(path)?;
    file.write_all(command.as_bytes())?;
    // mode() only applies at creation; refresh permissions on rewrite.
    fs::set_permissions(path, fs::Permissions::from_mode(SCRIPT_MODE))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_write_creates_executable_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.sh");

        assert!(write_launch_script("gor --input-raw :8080", &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "gor --input-raw :8080");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_unchanged_content_skips_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.sh");

        assert!(write_launch_script("same command", &path));
        let first_mtime = fs::metadata(&path).unwrap().modified().unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert!(write_launch_script("same command", &path));
        let second_mtime = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(first_mtime, second_mtime);
    }

    #[test]
    fn test_changed_content_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.sh");

        assert!(write_launch_script("old command", &path));
        assert!(write_launch_script("new command", &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new command");
    }

    #[test]
    fn test_unwritable_path_returns_false() {
        let path = Path::new("/does/not/exist/mirror.sh");
        assert!(!write_launch_script("command", path));
    }
}
