//! On-disk formats: Wavefront-style geometry and the section-delimited
//! project metadata that rides alongside it.

mod obj;
mod project;

pub use obj::*;
pub use project::*;

use std::fs;
use std::path::{Path, PathBuf};

/// Writes the whole file, then renames over the destination, so an
/// interrupted save never leaves a half-written file behind.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
