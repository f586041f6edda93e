/*!
 * Shared test doubles
 */

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fs_sandbox::vfs::{
    Entry, FileProvider, MemFs, Metadata, OpenFlags, ProviderFile, VfsResult,
};

/// Provider double that counts every call reaching it, so tests can assert
/// a rejected operation never touched the backing store.
pub struct CountingFs {
    inner: MemFs,
    calls: AtomicUsize,
}

impl CountingFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemFs::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemFs {
        &self.inner
    }

    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl FileProvider for CountingFs {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        self.bump();
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        self.bump();
        self.inner.write_file(path, data, mode)
    }

    fn append_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        self.bump();
        self.inner.append_file(path, data, mode)
    }

    fn exists(&self, path: &Path) -> bool {
        self.bump();
        self.inner.exists(path)
    }

    fn stat(&self, path: &Path) -> VfsResult<Metadata> {
        self.bump();
        self.inner.stat(path)
    }

    fn readdir(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        self.bump();
        self.inner.readdir(path)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> VfsResult<()> {
        self.bump();
        self.inner.mkdir(path, mode)
    }

    fn rmdir(&self, path: &Path) -> VfsResult<()> {
        self.bump();
        self.inner.rmdir(path)
    }

    fn unlink(&self, path: &Path) -> VfsResult<()> {
        self.bump();
        self.inner.unlink(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        self.bump();
        self.inner.rename(from, to)
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> VfsResult<Box<dyn ProviderFile>> {
        self.bump();
        self.inner.open(path, flags, mode)
    }

    fn name(&self) -> &str {
        "counting"
    }
}
