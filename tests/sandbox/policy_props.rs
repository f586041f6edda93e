/*!
 * Matcher Property Tests
 * Lexical matching invariants over generated paths
 */

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use fs_sandbox::dispatch::Guard;
use fs_sandbox::policy::{MatchBoundary, Normalize, PathMatcher, SandboxPolicy};
use fs_sandbox::registry;

fn legacy_allow(patterns: &[&str]) -> PathMatcher {
    PathMatcher::compile(
        SandboxPolicy::allow(patterns.iter().copied()),
        Normalize::FreeForm,
    )
}

proptest! {
    #[test]
    fn prop_legacy_allow_is_byte_prefix(path in "/[a-z0-9/._-]{0,24}") {
        let patterns = ["/data", "/tmp/scratch", "/var/lib/app"];
        let matcher = legacy_allow(&patterns);
        // is_allowed gets an already-normalized path, so the oracle is a
        // plain byte-prefix scan
        let expected = patterns.iter().any(|p| path.as_bytes().starts_with(p.as_bytes()));
        prop_assert_eq!(matcher.is_allowed(Path::new(&path)), expected);
    }

    #[test]
    fn prop_deny_is_allow_complement(path in "/[a-z0-9/._-]{0,24}") {
        let patterns = ["/data", "/etc"];
        let allow = legacy_allow(&patterns);
        let deny = PathMatcher::compile(
            SandboxPolicy::deny(patterns),
            Normalize::FreeForm,
        );
        prop_assert_eq!(deny.is_allowed(Path::new(&path)), !allow.is_allowed(Path::new(&path)));
    }

    #[test]
    fn prop_component_match_implies_legacy_match(path in "/[a-z0-9/._-]{0,24}") {
        let component = PathMatcher::compile(
            SandboxPolicy::allow(["/data"]).with_boundary(MatchBoundary::Component),
            Normalize::FreeForm,
        );
        let legacy = legacy_allow(&["/data"]);
        if component.is_allowed(Path::new(&path)) {
            prop_assert!(legacy.is_allowed(Path::new(&path)));
        }
    }

    #[test]
    fn prop_rooted_admissions_stay_under_root(
        path in r"(\.\./|[a-z]{1,6}/){0,4}[a-z]{1,6}"
    ) {
        let matcher = PathMatcher::compile(
            SandboxPolicy::allow(["/srv/data"]),
            Normalize::rooted("/srv/data"),
        );
        let guard = Guard::new(matcher);
        match guard.admit_one(&registry::STAT, Path::new(&path)) {
            Ok(admitted) => {
                // admitted paths are rewritten absolute and confined
                prop_assert!(admitted.starts_with(PathBuf::from("/srv/data")));
            }
            Err(err) => {
                prop_assert_eq!(err.code(), "ENOENT");
                prop_assert_eq!(err.path(), Some(path.as_str()));
            }
        }
    }
}
