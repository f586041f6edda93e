/*!
 * Guarded Dispatcher
 * Validates and rewrites path arguments before provider delegation
 */

use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::policy::PathMatcher;
use crate::registry::OpSpec;
use crate::vfs::{VfsError, VfsResult};

/// The policy gate every facade call passes through.
///
/// Stateless across calls apart from the compiled matcher captured at
/// construction; one `Guard` serves any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Guard {
    matcher: PathMatcher,
}

impl Guard {
    pub fn new(matcher: PathMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// Validate an operation's path arguments against policy.
    ///
    /// `args` holds the operation's path arguments in call order; a `None`
    /// slot means that position was not supplied, which skips validation for
    /// it rather than failing. Guarded positions are checked in the order the
    /// spec lists them; the first miss wins.
    ///
    /// On success the returned slots carry the paths to delegate: the
    /// resolved absolute form when the matcher rewrites (root-anchored
    /// normalization), the caller's own spelling otherwise. On violation the
    /// error is the not-found shape carrying the *original* caller-supplied
    /// path, indistinguishable from a genuinely absent file.
    pub fn admit(
        &self,
        spec: &'static OpSpec,
        args: &[Option<&Path>],
    ) -> VfsResult<Vec<Option<PathBuf>>> {
        let mut admitted: Vec<Option<PathBuf>> =
            args.iter().map(|arg| arg.map(Path::to_path_buf)).collect();

        for &index in spec.guarded {
            let Some(Some(original)) = args.get(index) else {
                continue;
            };
            let normalized = self.matcher.normalize(original);
            trace!(
                "guard: {} arg {} {:?} -> {:?}",
                spec.name,
                index,
                original,
                normalized
            );
            if !self.matcher.is_allowed(&normalized) {
                debug!("guard: {} rejected {:?}", spec.name, original);
                return Err(VfsError::NotFound {
                    path: original.display().to_string(),
                });
            }
            if self.matcher.rewrites() {
                admitted[index] = Some(normalized);
            }
        }

        Ok(admitted)
    }

    /// Admit a single-path operation, returning the path to delegate.
    pub fn admit_one(&self, spec: &'static OpSpec, path: &Path) -> VfsResult<PathBuf> {
        let mut admitted = self.admit(spec, &[Some(path)])?;
        Ok(admitted
            .pop()
            .flatten()
            .unwrap_or_else(|| path.to_path_buf()))
    }

    /// Admit a two-path operation (`rename`), returning both delegated paths.
    pub fn admit_pair(
        &self,
        spec: &'static OpSpec,
        first: &Path,
        second: &Path,
    ) -> VfsResult<(PathBuf, PathBuf)> {
        let mut admitted = self.admit(spec, &[Some(first), Some(second)])?;
        let b = admitted
            .pop()
            .flatten()
            .unwrap_or_else(|| second.to_path_buf());
        let a = admitted
            .pop()
            .flatten()
            .unwrap_or_else(|| first.to_path_buf());
        Ok((a, b))
    }
}
