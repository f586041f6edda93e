/*!
 * Scoped File Handle
 * An open descriptor bound to its already-validated path
 */

use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::registry::DEFAULT_FILE_MODE;
use crate::vfs::{FileProvider, Metadata, ProviderFile, VfsError, VfsResult};

use super::run_blocking;

/// A descriptor produced by a guarded `open`, bundled with the path that was
/// validated to obtain it.
///
/// None of its operations re-consult the policy: the descriptor family takes
/// no path at all, and the path family reuses the path that already passed
/// validation at `open` time. The bound path stays referentially stable for
/// the handle's lifetime, so path operations keep working even after `close`
/// releases the descriptor; descriptor operations on a closed handle fail
/// with the natural bad-descriptor error.
#[derive(Clone)]
pub struct ScopedFile {
    provider: Arc<dyn FileProvider>,
    file: Arc<Mutex<Option<Box<dyn ProviderFile>>>>,
    path: PathBuf,
}

impl fmt::Debug for ScopedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedFile")
            .field("path", &self.path)
            .field("closed", &self.file.lock().is_none())
            .finish()
    }
}

impl ScopedFile {
    pub(crate) fn new(
        provider: Arc<dyn FileProvider>,
        file: Box<dyn ProviderFile>,
        path: PathBuf,
    ) -> Self {
        Self {
            provider,
            file: Arc::new(Mutex::new(Some(file))),
            path,
        }
    }

    /// The validated path this handle is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `close` has released the descriptor.
    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    fn with_file<T>(
        &self,
        op: impl FnOnce(&mut Box<dyn ProviderFile>) -> VfsResult<T>,
    ) -> VfsResult<T> {
        let mut slot = self.file.lock();
        match slot.as_mut() {
            Some(file) => op(file),
            None => Err(VfsError::BadDescriptor),
        }
    }

    // --- descriptor-scoped, synchronous ---

    /// Read into `buf` at the current position.
    pub fn read_sync(&self, buf: &mut [u8]) -> VfsResult<usize> {
        self.with_file(|file| file.read(buf))
    }

    /// Write at the current position.
    pub fn write_sync(&self, data: &[u8]) -> VfsResult<usize> {
        self.with_file(|file| file.write(data))
    }

    /// Reposition the descriptor.
    pub fn seek_sync(&self, pos: SeekFrom) -> VfsResult<u64> {
        self.with_file(|file| file.seek(pos))
    }

    /// Flush to the backing store.
    pub fn sync_all_sync(&self) -> VfsResult<()> {
        self.with_file(|file| file.sync_all())
    }

    /// Truncate or extend to `size` bytes.
    pub fn truncate_sync(&self, size: u64) -> VfsResult<()> {
        self.with_file(|file| file.set_len(size))
    }

    /// Metadata for the open descriptor.
    pub fn stat_sync(&self) -> VfsResult<Metadata> {
        self.with_file(|file| file.stat())
    }

    /// Change permission bits on the descriptor.
    pub fn chmod_sync(&self, mode: u32) -> VfsResult<()> {
        self.with_file(|file| file.chmod(mode))
    }

    /// Change ownership on the descriptor.
    pub fn chown_sync(&self, uid: Option<u32>, gid: Option<u32>) -> VfsResult<()> {
        self.with_file(|file| file.chown(uid, gid))
    }

    /// Release the descriptor. Descriptor operations afterwards fail with
    /// the bad-descriptor error; path operations keep working.
    pub fn close_sync(&self) -> VfsResult<()> {
        match self.file.lock().take() {
            Some(file) => {
                drop(file);
                Ok(())
            }
            None => Err(VfsError::BadDescriptor),
        }
    }

    // --- descriptor-scoped, asynchronous ---

    /// Read up to `len` bytes at the current position.
    pub async fn read(&self, len: usize) -> VfsResult<Vec<u8>> {
        let this = self.clone();
        run_blocking(move || {
            let mut buf = vec![0u8; len];
            let n = this.read_sync(&mut buf)?;
            buf.truncate(n);
            Ok(buf)
        })
        .await
    }

    /// Write at the current position.
    pub async fn write(&self, data: &[u8]) -> VfsResult<usize> {
        let this = self.clone();
        let data = data.to_vec();
        run_blocking(move || this.write_sync(&data)).await
    }

    /// Reposition the descriptor.
    pub async fn seek(&self, pos: SeekFrom) -> VfsResult<u64> {
        let this = self.clone();
        run_blocking(move || this.seek_sync(pos)).await
    }

    /// Flush to the backing store.
    pub async fn sync_all(&self) -> VfsResult<()> {
        let this = self.clone();
        run_blocking(move || this.sync_all_sync()).await
    }

    /// Truncate or extend to `size` bytes.
    pub async fn truncate(&self, size: u64) -> VfsResult<()> {
        let this = self.clone();
        run_blocking(move || this.truncate_sync(size)).await
    }

    /// Metadata for the open descriptor.
    pub async fn stat(&self) -> VfsResult<Metadata> {
        let this = self.clone();
        run_blocking(move || this.stat_sync()).await
    }

    /// Change permission bits on the descriptor.
    pub async fn chmod(&self, mode: u32) -> VfsResult<()> {
        let this = self.clone();
        run_blocking(move || this.chmod_sync(mode)).await
    }

    /// Change ownership on the descriptor.
    pub async fn chown(&self, uid: Option<u32>, gid: Option<u32>) -> VfsResult<()> {
        let this = self.clone();
        run_blocking(move || this.chown_sync(uid, gid)).await
    }

    /// Release the descriptor.
    pub async fn close(&self) -> VfsResult<()> {
        let this = self.clone();
        run_blocking(move || this.close_sync()).await
    }

    // --- path-scoped, synchronous ---

    /// Read the whole bound file.
    pub fn read_file_sync(&self) -> VfsResult<Vec<u8>> {
        self.provider.read_file(&self.path)
    }

    /// Overwrite the whole bound file.
    pub fn write_file_sync(&self, data: &[u8]) -> VfsResult<()> {
        self.provider.write_file(&self.path, data, DEFAULT_FILE_MODE)
    }

    /// Append to the bound file.
    pub fn append_file_sync(&self, data: &[u8]) -> VfsResult<()> {
        self.provider.append_file(&self.path, data, DEFAULT_FILE_MODE)
    }

    /// Delete the bound file.
    pub fn unlink_sync(&self) -> VfsResult<()> {
        self.provider.unlink(&self.path)
    }

    // --- path-scoped, asynchronous ---

    /// Read the whole bound file.
    pub async fn read_file(&self) -> VfsResult<Vec<u8>> {
        let provider = Arc::clone(&self.provider);
        let path = self.path.clone();
        run_blocking(move || provider.read_file(&path)).await
    }

    /// Overwrite the whole bound file.
    pub async fn write_file(&self, data: &[u8]) -> VfsResult<()> {
        let provider = Arc::clone(&self.provider);
        let path = self.path.clone();
        let data = data.to_vec();
        run_blocking(move || provider.write_file(&path, &data, DEFAULT_FILE_MODE)).await
    }

    /// Append to the bound file.
    pub async fn append_file(&self, data: &[u8]) -> VfsResult<()> {
        let provider = Arc::clone(&self.provider);
        let path = self.path.clone();
        let data = data.to_vec();
        run_blocking(move || provider.append_file(&path, &data, DEFAULT_FILE_MODE)).await
    }

    /// Delete the bound file.
    pub async fn unlink(&self) -> VfsResult<()> {
        let provider = Arc::clone(&self.provider);
        let path = self.path.clone();
        run_blocking(move || provider.unlink(&path)).await
    }
}
