/*!
 * Sandbox Facade
 * The guarded operation surface assembled over a provider
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::dispatch::Guard;
use crate::policy::{Normalize, PathMatcher, PolicyMode, SandboxPolicy};
use crate::registry::{self, OpSpec, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::vfs::{Entry, FileProvider, Metadata, OpenFlags, VfsResult};

use super::handle::ScopedFile;
use super::run_blocking;

/// Policy-guarded filesystem surface.
///
/// Every operation validates its path arguments before the provider is
/// touched; violations surface as the not-found-shaped error through the same
/// channel as any genuine failure (the `Err` return of the sync form, the
/// `Err` resolution of the async form). The facade captures only the
/// immutable guard and the provider, so it is cheap to clone and safe to
/// share across threads.
///
/// Watch/notify has no surface here: neither variant of the guarded API ever
/// implemented it.
#[derive(Debug, Clone)]
pub struct SandboxFs {
    provider: Arc<dyn FileProvider>,
    guard: Guard,
}

impl SandboxFs {
    /// Root-anchored flavor: one root directory, relative paths resolve
    /// against it, admitted paths are rewritten to absolute form before
    /// delegation.
    pub fn rooted(provider: Arc<dyn FileProvider>, root: impl Into<PathBuf>) -> Self {
        let root = path_clean::clean(root.into());
        let policy = SandboxPolicy::allow([root.clone()]);
        let matcher = PathMatcher::compile(policy, Normalize::rooted(root));
        Self {
            provider,
            guard: Guard::new(matcher),
        }
    }

    /// Filter-list flavor: explicit prefixes and an allow/deny mode, no
    /// root resolution, no rewriting of the validated argument.
    pub fn filtered<I, P>(provider: Arc<dyn FileProvider>, prefixes: I, mode: PolicyMode) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let policy = match mode {
            PolicyMode::Allow => SandboxPolicy::allow(prefixes),
            PolicyMode::Deny => SandboxPolicy::deny(prefixes),
        };
        Self::with_policy(provider, policy)
    }

    /// General form over a pre-built policy (free-form normalization); the
    /// place to opt into component-boundary matching.
    pub fn with_policy(provider: Arc<dyn FileProvider>, policy: SandboxPolicy) -> Self {
        let matcher = PathMatcher::compile(policy, Normalize::FreeForm);
        Self {
            provider,
            guard: Guard::new(matcher),
        }
    }

    pub fn provider(&self) -> &Arc<dyn FileProvider> {
        &self.provider
    }

    pub fn policy(&self) -> &SandboxPolicy {
        self.guard.matcher().policy()
    }

    fn mode_for(spec: &'static OpSpec, requested: u32) -> u32 {
        let mode = spec.effective_mode(requested);
        if mode != requested {
            debug!(
                "sandbox: {} mode {:o} overridden to {:o}",
                spec.name, requested, mode
            );
        }
        mode
    }

    // --- synchronous surface ---

    pub fn stat_sync(&self, path: impl AsRef<Path>) -> VfsResult<Metadata> {
        let path = self.guard.admit_one(&registry::STAT, path.as_ref())?;
        self.provider.stat(&path)
    }

    pub fn readdir_sync(&self, path: impl AsRef<Path>) -> VfsResult<Vec<Entry>> {
        let path = self.guard.admit_one(&registry::READDIR, path.as_ref())?;
        self.provider.readdir(&path)
    }

    /// Both path arguments are validated; a violation on either rejects the
    /// whole call.
    pub fn rename_sync(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> VfsResult<()> {
        let (from, to) = self
            .guard
            .admit_pair(&registry::RENAME, from.as_ref(), to.as_ref())?;
        self.provider.rename(&from, &to)
    }

    pub fn rmdir_sync(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::RMDIR, path.as_ref())?;
        self.provider.rmdir(&path)
    }

    pub fn unlink_sync(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::UNLINK, path.as_ref())?;
        self.provider.unlink(&path)
    }

    /// False for out-of-policy paths, indistinguishable from absent ones;
    /// the provider is never consulted on a violation.
    pub fn exists_sync(&self, path: impl AsRef<Path>) -> bool {
        match self.guard.admit_one(&registry::EXISTS, path.as_ref()) {
            Ok(path) => self.provider.exists(&path),
            Err(_) => false,
        }
    }

    pub fn mkdir_sync(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        self.mkdir_with_mode_sync(path, DEFAULT_DIR_MODE)
    }

    /// The requested mode is always replaced with the fixed directory
    /// default; sandboxed callers do not choose creation permissions.
    pub fn mkdir_with_mode_sync(&self, path: impl AsRef<Path>, mode: u32) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::MKDIR, path.as_ref())?;
        self.provider.mkdir(&path, Self::mode_for(&registry::MKDIR, mode))
    }

    pub fn read_file_sync(&self, path: impl AsRef<Path>) -> VfsResult<Vec<u8>> {
        let path = self.guard.admit_one(&registry::READ_FILE, path.as_ref())?;
        self.provider.read_file(&path)
    }

    pub fn write_file_sync(&self, path: impl AsRef<Path>, data: &[u8]) -> VfsResult<()> {
        self.write_file_with_mode_sync(path, data, DEFAULT_FILE_MODE)
    }

    pub fn write_file_with_mode_sync(
        &self,
        path: impl AsRef<Path>,
        data: &[u8],
        mode: u32,
    ) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::WRITE_FILE, path.as_ref())?;
        self.provider
            .write_file(&path, data, Self::mode_for(&registry::WRITE_FILE, mode))
    }

    pub fn append_file_sync(&self, path: impl AsRef<Path>, data: &[u8]) -> VfsResult<()> {
        self.append_file_with_mode_sync(path, data, DEFAULT_FILE_MODE)
    }

    pub fn append_file_with_mode_sync(
        &self,
        path: impl AsRef<Path>,
        data: &[u8],
        mode: u32,
    ) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::APPEND_FILE, path.as_ref())?;
        self.provider
            .append_file(&path, data, Self::mode_for(&registry::APPEND_FILE, mode))
    }

    pub fn open_sync(&self, path: impl AsRef<Path>, flags: OpenFlags) -> VfsResult<ScopedFile> {
        self.open_with_mode_sync(path, flags, DEFAULT_FILE_MODE)
    }

    /// Guarded open returning a [`ScopedFile`] bound to the validated path
    /// instead of a raw descriptor. The requested creation mode is always
    /// replaced with the fixed file default.
    pub fn open_with_mode_sync(
        &self,
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: u32,
    ) -> VfsResult<ScopedFile> {
        let path = self.guard.admit_one(&registry::OPEN, path.as_ref())?;
        let file = self
            .provider
            .open(&path, flags, Self::mode_for(&registry::OPEN, mode))?;
        Ok(ScopedFile::new(Arc::clone(&self.provider), file, path))
    }

    // --- asynchronous surface ---
    //
    // Validation runs before the first suspension point; only provider
    // delegation is dispatched to the blocking pool.

    pub async fn stat(&self, path: impl AsRef<Path>) -> VfsResult<Metadata> {
        let path = self.guard.admit_one(&registry::STAT, path.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.stat(&path)).await
    }

    pub async fn readdir(&self, path: impl AsRef<Path>) -> VfsResult<Vec<Entry>> {
        let path = self.guard.admit_one(&registry::READDIR, path.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.readdir(&path)).await
    }

    /// Both path arguments are validated; a violation on either rejects the
    /// whole call.
    pub async fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> VfsResult<()> {
        let (from, to) = self
            .guard
            .admit_pair(&registry::RENAME, from.as_ref(), to.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.rename(&from, &to)).await
    }

    pub async fn rmdir(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::RMDIR, path.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.rmdir(&path)).await
    }

    pub async fn unlink(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::UNLINK, path.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.unlink(&path)).await
    }

    /// False for out-of-policy paths, indistinguishable from absent ones.
    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        let Ok(path) = self.guard.admit_one(&registry::EXISTS, path.as_ref()) else {
            return false;
        };
        let provider = Arc::clone(&self.provider);
        run_blocking(move || Ok(provider.exists(&path)))
            .await
            .unwrap_or(false)
    }

    pub async fn mkdir(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        self.mkdir_with_mode(path, DEFAULT_DIR_MODE).await
    }

    /// The requested mode is always replaced with the fixed directory
    /// default.
    pub async fn mkdir_with_mode(&self, path: impl AsRef<Path>, mode: u32) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::MKDIR, path.as_ref())?;
        let mode = Self::mode_for(&registry::MKDIR, mode);
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.mkdir(&path, mode)).await
    }

    pub async fn read_file(&self, path: impl AsRef<Path>) -> VfsResult<Vec<u8>> {
        let path = self.guard.admit_one(&registry::READ_FILE, path.as_ref())?;
        let provider = Arc::clone(&self.provider);
        run_blocking(move || provider.read_file(&path)).await
    }

    pub async fn write_file(&self, path: impl AsRef<Path>, data: &[u8]) -> VfsResult<()> {
        self.write_file_with_mode(path, data, DEFAULT_FILE_MODE).await
    }

    pub async fn write_file_with_mode(
        &self,
        path: impl AsRef<Path>,
        data: &[u8],
        mode: u32,
    ) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::WRITE_FILE, path.as_ref())?;
        let mode = Self::mode_for(&registry::WRITE_FILE, mode);
        let provider = Arc::clone(&self.provider);
        let data = data.to_vec();
        run_blocking(move || provider.write_file(&path, &data, mode)).await
    }

    pub async fn append_file(&self, path: impl AsRef<Path>, data: &[u8]) -> VfsResult<()> {
        self.append_file_with_mode(path, data, DEFAULT_FILE_MODE).await
    }

    pub async fn append_file_with_mode(
        &self,
        path: impl AsRef<Path>,
        data: &[u8],
        mode: u32,
    ) -> VfsResult<()> {
        let path = self.guard.admit_one(&registry::APPEND_FILE, path.as_ref())?;
        let mode = Self::mode_for(&registry::APPEND_FILE, mode);
        let provider = Arc::clone(&self.provider);
        let data = data.to_vec();
        run_blocking(move || provider.append_file(&path, &data, mode)).await
    }

    pub async fn open(&self, path: impl AsRef<Path>, flags: OpenFlags) -> VfsResult<ScopedFile> {
        self.open_with_mode(path, flags, DEFAULT_FILE_MODE).await
    }

    /// Guarded open returning a [`ScopedFile`] bound to the validated path.
    pub async fn open_with_mode(
        &self,
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: u32,
    ) -> VfsResult<ScopedFile> {
        let path = self.guard.admit_one(&registry::OPEN, path.as_ref())?;
        let mode = Self::mode_for(&registry::OPEN, mode);
        let provider = Arc::clone(&self.provider);
        let opened = {
            let provider = Arc::clone(&provider);
            let path = path.clone();
            run_blocking(move || provider.open(&path, flags, mode)).await?
        };
        Ok(ScopedFile::new(provider, opened, path))
    }
}

/// Build the root-anchored facade flavor.
pub fn create_root_sandbox(
    provider: Arc<dyn FileProvider>,
    root: impl Into<PathBuf>,
) -> SandboxFs {
    SandboxFs::rooted(provider, root)
}

/// Build the filter-list facade flavor.
pub fn create_filtered_sandbox<I, P>(
    provider: Arc<dyn FileProvider>,
    prefixes: I,
    mode: PolicyMode,
) -> SandboxFs
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    SandboxFs::filtered(provider, prefixes, mode)
}
