//! Containment rule: SSL resources may only be read from inside the
//! configuration directory.
//!
//! The check is lexical and runs before the file is opened, so a path
//! outside the directory is reported as blocked whatever its permissions.

use std::path::Path;

use crate::error::ResourceError;
use crate::resolver::normalize;

/// Allow `path` only if it lies within `config_dir` after normalization.
/// A relative or empty `config_dir` contains nothing.
pub fn check(path: &Path, config_dir: &Path) -> Result<(), ResourceError> {
    if config_dir.is_absolute() && normalize(path).starts_with(normalize(config_dir)) {
        Ok(())
    } else {
        Err(ResourceError::PolicyBlocked {
            path: path.to_path_buf(),
            config_dir: config_dir.to_path_buf(),
        })
    }
}
