/*!
 * Provider Data Types
 * Metadata, directory entries, permissions and open flags
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};

/// File type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Directory,
    Symlink,
    #[default]
    Unknown,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::Directory => write!(f, "directory"),
            FileType::Symlink => write!(f, "symlink"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Unix-style file permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    pub mode: u32,
}

impl Permissions {
    /// Create permissions, masking to the valid mode bits.
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// No write bits set.
    #[inline]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.mode & 0o222 == 0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self { mode: 0o644 }
    }
}

/// File metadata as reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Metadata {
    pub file_type: FileType,
    pub size: u64,
    pub permissions: Permissions,
    pub modified: SystemTime,
    pub created: SystemTime,
}

impl Metadata {
    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }
}

/// Directory entry. Names are single path components: non-empty, no
/// separators, no null bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub file_type: FileType,
}

impl Entry {
    /// Create an entry, validating the name.
    pub fn new(name: String, file_type: FileType) -> VfsResult<Self> {
        if name.is_empty() {
            return Err(VfsError::InvalidArgument("entry name is empty".into()));
        }
        if name.contains('\0') || name.contains('/') || name.contains('\\') {
            return Err(VfsError::InvalidArgument(format!(
                "entry name contains illegal characters: {name:?}"
            )));
        }
        Ok(Self { name, file_type })
    }

    /// Create an entry without validation (provider-internal use).
    pub(crate) fn new_unchecked(name: String, file_type: FileType) -> Self {
        Self { name, file_type }
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }
}

/// File open flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
    pub create_new: bool,
}

impl OpenFlags {
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// Write + create, the usual flags for producing a new file.
    #[inline]
    #[must_use]
    pub fn create() -> Self {
        Self {
            write: true,
            create: true,
            ..Default::default()
        }
    }

    /// Write + append.
    #[inline]
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            write: true,
            append: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.write || self.append
    }

    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create || self.create_new
    }

    /// Reject contradictory flag combinations before they reach a provider.
    pub fn validate(&self) -> VfsResult<()> {
        if self.truncate && !self.write {
            return Err(VfsError::InvalidArgument("truncate requires write".into()));
        }
        if self.append && self.truncate {
            return Err(VfsError::InvalidArgument(
                "append and truncate are mutually exclusive".into(),
            ));
        }
        if self.will_create() && !self.is_writable() {
            return Err(VfsError::InvalidArgument(
                "create requires write or append".into(),
            ));
        }
        Ok(())
    }
}
