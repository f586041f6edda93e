/*!
 * Provider Error Types
 * Structured filesystem errors with stable code/errno pairs
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider operation result
#[must_use = "filesystem operations can fail and must be handled"]
pub type VfsResult<T> = Result<T, VfsError>;

/// Filesystem errors with stable `code()`/`errno()` pairs.
///
/// Policy violations are synthesized as [`VfsError::NotFound`] carrying the
/// original caller-supplied path, so a denied path is indistinguishable from
/// an absent one.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("ENOENT: no such file or directory, '{path}'")]
    NotFound { path: String },

    #[error("EBADF: bad file descriptor")]
    BadDescriptor,

    #[error("EACCES: permission denied, '{path}'")]
    PermissionDenied { path: String },

    #[error("EEXIST: file already exists, '{path}'")]
    AlreadyExists { path: String },

    #[error("ENOTDIR: not a directory, '{path}'")]
    NotADirectory { path: String },

    #[error("EISDIR: illegal operation on a directory, '{path}'")]
    IsADirectory { path: String },

    #[error("EINVAL: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("EIO: i/o error: {0}")]
    Io(String),
}

impl VfsError {
    /// Not-found error for a path, the shape every policy violation takes.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Stable string code, mirroring the host convention.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "ENOENT",
            Self::BadDescriptor => "EBADF",
            Self::PermissionDenied { .. } => "EACCES",
            Self::AlreadyExists { .. } => "EEXIST",
            Self::NotADirectory { .. } => "ENOTDIR",
            Self::IsADirectory { .. } => "EISDIR",
            Self::InvalidArgument(_) => "EINVAL",
            Self::Io(_) => "EIO",
        }
    }

    /// Stable numeric errno. ENOENT maps to 34 (the legacy convention this
    /// surface inherits), not the kernel's 2.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 34,
            Self::BadDescriptor => 9,
            Self::PermissionDenied { .. } => 13,
            Self::AlreadyExists { .. } => 17,
            Self::NotADirectory { .. } => 20,
            Self::IsADirectory { .. } => 21,
            Self::InvalidArgument(_) => 22,
            Self::Io(_) => 5,
        }
    }

    /// The path this error refers to, when it carries one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::AlreadyExists { path }
            | Self::NotADirectory { path }
            | Self::IsADirectory { path } => Some(path),
            _ => None,
        }
    }
}
