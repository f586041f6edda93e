/*!
 * Path Normalization Strategies
 * Root-anchored resolution and free-form lexical cleaning
 */

use path_clean::clean;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a caller-supplied path is normalized before policy matching.
///
/// Normalization is purely lexical: `.` and `..` segments are collapsed
/// without consulting the filesystem, so symlinks are never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalize {
    /// Resolve relative paths against a fixed root directory (absolute
    /// inputs are kept as-is), then collapse `.`/`..`. Admitted arguments
    /// are rewritten to this resolved absolute form before delegation.
    RootAnchored { root: PathBuf },
    /// Collapse `.`/`..` only; nothing is resolved against a root and
    /// admitted arguments are delegated exactly as the caller supplied them.
    FreeForm,
}

impl Normalize {
    /// Root-anchored strategy for the given root directory.
    pub fn rooted<P: Into<PathBuf>>(root: P) -> Self {
        Self::RootAnchored { root: root.into() }
    }

    /// Normalize `path` for policy matching.
    pub fn apply(&self, path: &Path) -> PathBuf {
        match self {
            Self::RootAnchored { root } => {
                if path.is_absolute() {
                    clean(path)
                } else {
                    clean(root.join(path))
                }
            }
            Self::FreeForm => clean(path),
        }
    }

    /// Whether admitted arguments are rewritten to their normalized form.
    #[inline]
    #[must_use]
    pub const fn rewrites(&self) -> bool {
        matches!(self, Self::RootAnchored { .. })
    }
}
