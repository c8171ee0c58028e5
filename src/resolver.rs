//! Turns configured path strings into absolute paths under the
//! configuration directory. No filesystem access happens here.

use std::path::{Component, Path, PathBuf};

/// Resolve `configured` against `config_dir`.
///
/// Relative strings land under `config_dir`; absolute strings are returned
/// as given so that [`crate::policy`] can judge them.
pub fn resolve(config_dir: &Path, configured: &str) -> PathBuf {
    let configured = Path::new(configured.trim());
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        config_dir.join(configured)
    }
}

/// Lexically normalize `path`: drop `.` components and fold `..` into
/// their parent. A `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
