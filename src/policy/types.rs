/*!
 * Policy Types
 * Allow/deny path-prefix policies captured at sandbox construction
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy direction: whitelist or blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Paths are reachable only if they match at least one prefix.
    Allow,
    /// Paths are reachable only if they match none of the prefixes.
    Deny,
}

/// Prefix boundary semantics used when a pattern is compared against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchBoundary {
    /// Plain byte-prefix comparison: a prefix `/data` also matches
    /// `/data-secret`. This sibling leakage is a known weakness of the
    /// default, kept for compatibility with existing policies.
    #[default]
    LegacyPrefix,
    /// The prefix must end on a path-component boundary: `/data` matches
    /// `/data/log` but not `/data-secret`.
    Component,
}

/// Immutable path-prefix policy.
///
/// Patterns are matched lexically against normalized paths; the policy never
/// touches the filesystem. Constructed once when a sandbox is built and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxPolicy {
    /// Path prefixes, checked in order.
    pub patterns: Vec<PathBuf>,
    pub mode: PolicyMode,
    #[serde(default)]
    pub boundary: MatchBoundary,
}

impl SandboxPolicy {
    /// Whitelist policy: only paths under one of `patterns` are reachable.
    pub fn allow<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            mode: PolicyMode::Allow,
            boundary: MatchBoundary::default(),
        }
    }

    /// Blacklist policy: paths under any of `patterns` are unreachable.
    pub fn deny<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            mode: PolicyMode::Deny,
            boundary: MatchBoundary::default(),
        }
    }

    /// Override the prefix boundary semantics.
    #[must_use]
    pub fn with_boundary(mut self, boundary: MatchBoundary) -> Self {
        self.boundary = boundary;
        self
    }
}
