//! Path normalization
//!
//! Resolves caller-supplied paths into the absolute, lexically normalized form
//! used as registry key. Symlinks are not followed.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute path with no `.` or `..` components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CanonicalPath(PathBuf);

impl CanonicalPath {
    pub(crate) fn as_path(&self) -> &Path {
        &self.0
    }
}

/// Normalize `path` against the current working directory.
///
/// Only reads the working directory when `path` is relative.
pub(crate) fn normalize(path: &Path) -> io::Result<CanonicalPath> {
    if path.is_absolute() {
        return Ok(normalize_absolute(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(normalize_absolute(&cwd.join(path)))
}

fn normalize_absolute(path: &Path) -> CanonicalPath {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            // Popping the root is a no-op, so `/..` stays `/`
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    CanonicalPath(dunce::simplified(&normalized).to_path_buf())
}

/// Directory containing `path`, if it has one.
pub(crate) fn parent_directory(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}
