#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_STORE_DIRNAME: &str = ".tally";

/// Store directory used when none is given: `.tally` under the working
/// directory of the scheduled job.
pub(crate) fn default_storage_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(DEFAULT_STORE_DIRNAME)
}
