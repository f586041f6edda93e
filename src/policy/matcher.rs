/*!
 * Path Matcher
 * Compiles a policy and a normalization strategy into one path predicate
 */

use std::path::{Path, PathBuf};

use super::normalize::Normalize;
use super::types::{MatchBoundary, PolicyMode, SandboxPolicy};

/// Compiled policy predicate.
///
/// Matching is case-sensitive, purely lexical, and performs no I/O:
/// nonexistent paths match like any other and symlinks are never resolved.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    policy: SandboxPolicy,
    normalize: Normalize,
}

impl PathMatcher {
    /// Compile `policy` together with the normalization strategy used on
    /// every checked path.
    pub fn compile(policy: SandboxPolicy, normalize: Normalize) -> Self {
        Self { policy, normalize }
    }

    /// Normalize a caller-supplied path per the configured strategy.
    pub fn normalize(&self, path: &Path) -> PathBuf {
        self.normalize.apply(path)
    }

    /// Whether admitted arguments are rewritten to their normalized form.
    #[inline]
    pub const fn rewrites(&self) -> bool {
        self.normalize.rewrites()
    }

    /// Evaluate the policy on an already-normalized path.
    pub fn is_allowed(&self, normalized: &Path) -> bool {
        let hit = self
            .policy
            .patterns
            .iter()
            .any(|pattern| Self::matches(self.policy.boundary, normalized, pattern));

        match self.policy.mode {
            PolicyMode::Allow => hit,
            PolicyMode::Deny => !hit,
        }
    }

    /// Normalize and evaluate in one step.
    pub fn check(&self, path: &Path) -> bool {
        self.is_allowed(&self.normalize(path))
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    fn matches(boundary: MatchBoundary, path: &Path, pattern: &Path) -> bool {
        match boundary {
            MatchBoundary::LegacyPrefix => path
                .as_os_str()
                .as_encoded_bytes()
                .starts_with(pattern.as_os_str().as_encoded_bytes()),
            MatchBoundary::Component => path.starts_with(pattern),
        }
    }
}
