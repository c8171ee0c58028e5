//! Reads an approved file into memory.
//!
//! Existence is decided by the open itself, not a prior stat, so the
//! outcome reported is the one the read actually hit.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::ResourceError;

/// Read the whole of `path`. The file is closed on every return path.
pub fn read(path: &Path) -> Result<Vec<u8>, ResourceError> {
    let classify = |io: std::io::Error| {
        let path = path.to_path_buf();
        match io.kind() {
            ErrorKind::NotFound => ResourceError::NotFound { path, io },
            ErrorKind::PermissionDenied => ResourceError::AccessDenied { path, io },
            _ => ResourceError::Io { path, io },
        }
    };
    let mut file = File::open(path).map_err(classify)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(classify)?;
    Ok(contents)
}
