/*!
 * fs-sandbox Library
 * Policy-guarded filesystem access with scoped file handles
 */

pub mod dispatch;
pub mod policy;
pub mod registry;
pub mod sandbox;
pub mod vfs;

// Re-exports
pub use dispatch::Guard;
pub use policy::{MatchBoundary, Normalize, PathMatcher, PolicyMode, SandboxPolicy};
pub use registry::{ModeRewrite, OpSpec, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, REGISTRY};
pub use sandbox::{create_filtered_sandbox, create_root_sandbox, SandboxFs, ScopedFile};
pub use vfs::{
    Entry, FileProvider, FileType, LocalFs, MemFs, Metadata, OpenFlags, Permissions, ProviderFile,
    VfsError, VfsResult,
};
