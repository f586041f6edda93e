/*!
 * Sandbox Module
 * Guarded facade and the scoped file handle it produces
 */

pub mod facade;
pub mod handle;

// Re-exports
pub use facade::{create_filtered_sandbox, create_root_sandbox, SandboxFs};
pub use handle::ScopedFile;

use crate::vfs::{VfsError, VfsResult};

/// Dispatch a provider call onto the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(task: F) -> VfsResult<T>
where
    F: FnOnce() -> VfsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| VfsError::Io(format!("blocking task failed: {e}")))?
}
