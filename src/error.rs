//! Error types
//!
//! Every handle operation settles with either its success value or exactly one
//! [`FileError`]. Filesystem failures that carry an OS error code are
//! classified as [`FileError::Fs`]; anything else is [`FileError::Unexpected`].

use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Machine-readable filesystem error code (`EEXIST`, `ENOENT`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    /// The path already exists.
    pub const ALREADY_EXISTS: ErrorCode = ErrorCode(Cow::Borrowed("EEXIST"));
    /// The path does not exist.
    pub const NOT_FOUND: ErrorCode = ErrorCode(Cow::Borrowed("ENOENT"));
    /// A path component is not a directory.
    pub const NOT_A_DIRECTORY: ErrorCode = ErrorCode(Cow::Borrowed("ENOTDIR"));
    /// The path is a directory.
    pub const IS_A_DIRECTORY: ErrorCode = ErrorCode(Cow::Borrowed("EISDIR"));
    /// Access denied.
    pub const PERMISSION_DENIED: ErrorCode = ErrorCode(Cow::Borrowed("EACCES"));

    /// Stable string form of the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify an I/O error.
    ///
    /// Returns `None` when the error carries neither an OS error number nor a
    /// kind that maps onto one.
    pub fn from_io(err: &io::Error) -> Option<ErrorCode> {
        if let Some(errno) = err.raw_os_error() {
            return Some(Self::from_errno(errno, err.kind()));
        }
        match err.kind() {
            io::ErrorKind::AlreadyExists => Some(Self::ALREADY_EXISTS),
            io::ErrorKind::NotFound => Some(Self::NOT_FOUND),
            io::ErrorKind::PermissionDenied => Some(Self::PERMISSION_DENIED),
            _ => None,
        }
    }

    #[cfg(unix)]
    fn from_errno(errno: i32, _kind: io::ErrorKind) -> ErrorCode {
        let name = match errno {
            libc::EEXIST => "EEXIST",
            libc::ENOENT => "ENOENT",
            libc::ENOTDIR => "ENOTDIR",
            libc::EISDIR => "EISDIR",
            libc::EACCES => "EACCES",
            libc::EPERM => "EPERM",
            libc::ENOSPC => "ENOSPC",
            libc::EROFS => "EROFS",
            libc::ENAMETOOLONG => "ENAMETOOLONG",
            libc::ENOTEMPTY => "ENOTEMPTY",
            libc::EBUSY => "EBUSY",
            libc::EMFILE => "EMFILE",
            libc::EINVAL => "EINVAL",
            libc::EIO => "EIO",
            libc::ELOOP => "ELOOP",
            _ => return ErrorCode(Cow::Owned(format!("ERRNO_{}", errno))),
        };
        ErrorCode(Cow::Borrowed(name))
    }

    #[cfg(not(unix))]
    fn from_errno(errno: i32, kind: io::ErrorKind) -> ErrorCode {
        match kind {
            io::ErrorKind::AlreadyExists => Self::ALREADY_EXISTS,
            io::ErrorKind::NotFound => Self::NOT_FOUND,
            io::ErrorKind::PermissionDenied => Self::PERMISSION_DENIED,
            _ => ErrorCode(Cow::Owned(format!("ERRNO_{}", errno))),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a failed handle operation.
#[derive(Debug, Clone, Error)]
pub enum FileError {
    /// The filesystem reported a recognized error code.
    #[error("{code}: {}", .path.display())]
    Fs { code: ErrorCode, path: PathBuf },

    /// A failure with no recognizable code, or an internal inconsistency.
    #[error("UNEXPECTED: {reason}")]
    Unexpected { reason: String },
}

impl FileError {
    /// Classify an I/O error raised while operating on `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match ErrorCode::from_io(&err) {
            Some(code) => FileError::Fs {
                code,
                path: path.to_path_buf(),
            },
            None => FileError::Unexpected {
                reason: format!("{}: {}", path.display(), err),
            },
        }
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        FileError::Unexpected {
            reason: reason.into(),
        }
    }

    /// The classified code, if any.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            FileError::Fs { code, .. } => Some(code),
            FileError::Unexpected { .. } => None,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, FileError::Unexpected { .. })
    }
}

/// Configuration and logging setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
