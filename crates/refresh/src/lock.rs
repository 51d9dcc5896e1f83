#![forbid(unsafe_code)]

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub(crate) const LOCK_FILE_NAME: &str = "refresh.lock";

/// Exclusive hold on `<storage_dir>/refresh.lock` for the duration of one pass.
/// Released when dropped.
#[derive(Debug)]
pub(crate) struct RefreshLock {
    file: File,
    path: PathBuf,
}

impl RefreshLock {
    /// `Ok(None)` when another pass holds the lock.
    pub(crate) fn try_acquire(storage_dir: &Path) -> std::io::Result<Option<Self>> {
        std::fs::create_dir_all(storage_dir)?;
        let path = storage_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RefreshLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %err, "releasing refresh lock failed");
        }
    }
}
