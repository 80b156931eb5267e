//! Exclusive advisory lock held for the duration of a mutating operation.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::layout::TasksRoot;
use crate::error::TaskError;

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

/// Released when dropped.
#[derive(Debug)]
pub struct MutationLock {
    file: File,
    path: PathBuf,
}

impl MutationLock {
    pub fn acquire(root: &TasksRoot) -> Result<Self, TaskError> {
        Self::acquire_path(&root.lock_path(), DEFAULT_LOCK_TIMEOUT_MS)
    }

    pub fn acquire_path(path: &Path, timeout_ms: u64) -> Result<Self, TaskError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "acquired mutation lock");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock || is_contended(&e) => {
                    if start.elapsed() >= timeout {
                        tracing::warn!(path = %path.display(), "timed out waiting for mutation lock");
                        return Err(TaskError::lock_failed(path));
                    }
                    std::thread::sleep(Duration::from_millis(LOCK_RETRY_INTERVAL_MS));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(err: &io::Error) -> bool {
    // fs2 reports a held lock through the platform's own "would block" errno.
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for MutationLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_holder_times_out_until_first_drops() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".lock");

        let first = MutationLock::acquire_path(&path, 100).unwrap();
        let err = MutationLock::acquire_path(&path, 100).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::LockFailed);

        drop(first);
        let again = MutationLock::acquire_path(&path, 100).unwrap();
        assert_eq!(again.path(), path.as_path());
    }
}
