/*!
 * Virtual File System Module
 * Pluggable raw-I/O provider layer wrapped by the sandbox facade
 */

pub mod error;
pub mod local;
pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use error::{VfsError, VfsResult};
pub use local::LocalFs;
pub use memory::MemFs;
pub use traits::{FileProvider, ProviderFile};
pub use types::{Entry, FileType, Metadata, OpenFlags, Permissions};
