/*!
 * Sandbox Policy Module
 * Declarative path-prefix policies and the compiled matcher
 */

pub mod matcher;
pub mod normalize;
pub mod types;

// Re-exports
pub use matcher::PathMatcher;
pub use normalize::Normalize;
pub use types::{MatchBoundary, PolicyMode, SandboxPolicy};
