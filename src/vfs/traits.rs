/*!
 * Provider Traits
 * The raw I/O capability the sandbox facade wraps
 */

use std::io::SeekFrom;
use std::path::Path;

use super::error::VfsResult;
use super::types::{Entry, Metadata, OpenFlags};

/// Raw filesystem capability.
///
/// The facade performs all policy decisions before a provider method is
/// reached; providers implement plain blocking I/O against whatever backing
/// store they represent and never consult a policy themselves. The async
/// facade surface is derived by dispatching these calls onto the blocking
/// thread pool.
pub trait FileProvider: Send + Sync {
    /// Read entire file contents.
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write entire file contents (create or overwrite). `mode` applies only
    /// when the file is created.
    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()>;

    /// Append to a file, creating it with `mode` if absent.
    fn append_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Get metadata.
    fn stat(&self, path: &Path) -> VfsResult<Metadata>;

    /// List directory contents.
    fn readdir(&self, path: &Path) -> VfsResult<Vec<Entry>>;

    /// Create a directory with the given mode. Parents must exist.
    fn mkdir(&self, path: &Path, mode: u32) -> VfsResult<()>;

    /// Remove an empty directory.
    fn rmdir(&self, path: &Path) -> VfsResult<()>;

    /// Delete a file.
    fn unlink(&self, path: &Path) -> VfsResult<()>;

    /// Rename a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()>;

    /// Open a file, creating it with `mode` when the flags ask for creation.
    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> VfsResult<Box<dyn ProviderFile>>;

    /// Provider name, for logging.
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn FileProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileProvider({})", self.name())
    }
}

/// An open descriptor obtained from a provider.
///
/// Released when dropped; [`ScopedFile`](crate::sandbox::ScopedFile) wraps
/// one of these together with its validated path.
pub trait ProviderFile: Send {
    /// Read into `buf` at the current position, returning bytes read.
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize>;

    /// Write `buf` at the current position, returning bytes written.
    fn write(&mut self, buf: &[u8]) -> VfsResult<usize>;

    /// Reposition the descriptor, returning the new offset.
    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64>;

    /// Flush buffered data to the backing store.
    fn sync_all(&mut self) -> VfsResult<()>;

    /// Truncate or extend to `size` bytes.
    fn set_len(&mut self, size: u64) -> VfsResult<()>;

    /// Metadata for the open descriptor.
    fn stat(&self) -> VfsResult<Metadata>;

    /// Change permission bits on the open descriptor.
    fn chmod(&mut self, mode: u32) -> VfsResult<()>;

    /// Change ownership on the open descriptor.
    fn chown(&mut self, uid: Option<u32>, gid: Option<u32>) -> VfsResult<()>;
}

impl std::fmt::Debug for dyn ProviderFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProviderFile")
    }
}
