/*!
 * Facade Tests
 * Guarded operations through both facade flavors
 */

use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use fs_sandbox::policy::{MatchBoundary, PolicyMode, SandboxPolicy};
use fs_sandbox::sandbox::{create_filtered_sandbox, create_root_sandbox, SandboxFs};
use fs_sandbox::vfs::{FileProvider, MemFs};

use crate::helpers::CountingFs;

fn seeded_provider() -> Arc<MemFs> {
    let fs = MemFs::new();
    fs.mkdir(Path::new("/data"), 0o777).unwrap();
    fs.write_file(Path::new("/data/hello.txt"), b"hello", 0o666)
        .unwrap();
    fs.mkdir(Path::new("/secret"), 0o777).unwrap();
    fs.write_file(Path::new("/secret/key.txt"), b"key", 0o666)
        .unwrap();
    Arc::new(fs)
}

#[test]
fn test_allowed_operations_delegate() {
    let provider = seeded_provider();
    let sandbox = create_filtered_sandbox(provider, ["/data"], PolicyMode::Allow);

    assert_eq!(sandbox.read_file_sync("/data/hello.txt").unwrap(), b"hello");
    assert!(sandbox.stat_sync("/data/hello.txt").unwrap().is_file());
    assert!(sandbox.exists_sync("/data/hello.txt"));

    sandbox.write_file_sync("/data/new.txt", b"fresh").unwrap();
    assert_eq!(sandbox.read_file_sync("/data/new.txt").unwrap(), b"fresh");

    sandbox.append_file_sync("/data/new.txt", b" bits").unwrap();
    assert_eq!(sandbox.read_file_sync("/data/new.txt").unwrap(), b"fresh bits");

    sandbox.mkdir_sync("/data/sub").unwrap();
    sandbox.rename_sync("/data/new.txt", "/data/sub/moved.txt").unwrap();
    assert_eq!(
        sandbox.read_file_sync("/data/sub/moved.txt").unwrap(),
        b"fresh bits"
    );

    let names: Vec<String> = sandbox
        .readdir_sync("/data")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["hello.txt".to_string(), "sub".to_string()]);

    sandbox.unlink_sync("/data/sub/moved.txt").unwrap();
    sandbox.rmdir_sync("/data/sub").unwrap();
    assert!(!sandbox.exists_sync("/data/sub"));
}

#[test]
fn test_denied_path_never_reaches_provider() {
    let provider = CountingFs::new();
    let sandbox = SandboxFs::filtered(provider.clone(), ["/data"], PolicyMode::Allow);

    let err = sandbox.read_file_sync("/secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    assert_eq!(provider.calls(), 0);

    let err = sandbox.write_file_sync("/secret/new.txt", b"x").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    let err = sandbox.mkdir_sync("/secret/dir").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    let err = sandbox.stat_sync("/etc/passwd").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    let err = sandbox.readdir_sync("/secret").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    let err = sandbox.unlink_sync("/secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    let err = sandbox.rmdir_sync("/secret").unwrap_err();
    assert_eq!(err.code(), "ENOENT");

    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_rename_validates_both_arguments() {
    let provider = seeded_provider();
    let sandbox = create_filtered_sandbox(provider.clone(), ["/data"], PolicyMode::Allow);

    // destination outside
    let err = sandbox
        .rename_sync("/data/hello.txt", "/secret/stolen.txt")
        .unwrap_err();
    assert_eq!(err.path(), Some("/secret/stolen.txt"));
    assert!(provider.exists(Path::new("/data/hello.txt")));

    // source outside
    let err = sandbox
        .rename_sync("/secret/key.txt", "/data/taken.txt")
        .unwrap_err();
    assert_eq!(err.path(), Some("/secret/key.txt"));

    // both inside
    sandbox
        .rename_sync("/data/hello.txt", "/data/renamed.txt")
        .unwrap();
    assert!(provider.exists(Path::new("/data/renamed.txt")));
}

#[test]
fn test_deny_mode_inverts() {
    let provider = seeded_provider();
    let sandbox = create_filtered_sandbox(provider, ["/secret"], PolicyMode::Deny);

    assert_eq!(sandbox.read_file_sync("/data/hello.txt").unwrap(), b"hello");
    let err = sandbox.read_file_sync("/secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
}

#[test]
fn test_rooted_facade_resolves_relative_paths() {
    let provider = seeded_provider();
    let sandbox = create_root_sandbox(provider.clone(), "/data");

    // relative paths resolve against the root and are rewritten before
    // delegation, so the provider sees the absolute form
    assert_eq!(sandbox.read_file_sync("hello.txt").unwrap(), b"hello");
    sandbox.write_file_sync("rooted.txt", b"r").unwrap();
    assert!(provider.exists(Path::new("/data/rooted.txt")));

    // absolute in-root paths pass too
    assert_eq!(sandbox.read_file_sync("/data/hello.txt").unwrap(), b"hello");
}

#[test]
fn test_rooted_facade_rejects_escapes() {
    let provider = seeded_provider();
    let sandbox = create_root_sandbox(provider, "/data");

    // relative escape resolves outside the root
    let err = sandbox.read_file_sync("../secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    assert_eq!(err.path(), Some("../secret/key.txt"));

    // dotted escape through the root
    let err = sandbox.read_file_sync("/data/../secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");

    // plain absolute out-of-root
    let err = sandbox.read_file_sync("/secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
}

#[test]
fn test_exists_is_false_outside_policy() {
    let provider = CountingFs::new();
    provider.inner().mkdir(Path::new("/secret"), 0o777).unwrap();
    provider
        .inner()
        .write_file(Path::new("/secret/key.txt"), b"k", 0o666)
        .unwrap();
    let sandbox = SandboxFs::filtered(provider.clone(), ["/data"], PolicyMode::Allow);

    assert!(!sandbox.exists_sync("/secret/key.txt"));
    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_legacy_prefix_leaks_siblings() {
    let fs = MemFs::new();
    fs.mkdir(Path::new("/data-secret"), 0o777).unwrap();
    fs.write_file(Path::new("/data-secret/key.txt"), b"k", 0o666)
        .unwrap();
    let provider = Arc::new(fs);

    // default boundary: byte-prefix match admits the sibling directory
    let sandbox = create_filtered_sandbox(provider.clone(), ["/data"], PolicyMode::Allow);
    assert_eq!(sandbox.read_file_sync("/data-secret/key.txt").unwrap(), b"k");

    // component boundary closes the leak
    let policy = SandboxPolicy::allow(["/data"]).with_boundary(MatchBoundary::Component);
    let sandbox = SandboxFs::with_policy(provider, policy);
    let err = sandbox.read_file_sync("/data-secret/key.txt").unwrap_err();
    assert_eq!(err.code(), "ENOENT");
}

#[tokio::test]
async fn test_async_surface_delegates() {
    let provider = seeded_provider();
    let sandbox = create_filtered_sandbox(provider, ["/data"], PolicyMode::Allow);

    assert_eq!(sandbox.read_file("/data/hello.txt").await.unwrap(), b"hello");
    sandbox.write_file("/data/async.txt", b"async").await.unwrap();
    sandbox.append_file("/data/async.txt", b"!").await.unwrap();
    assert_eq!(sandbox.read_file("/data/async.txt").await.unwrap(), b"async!");

    sandbox.mkdir("/data/adir").await.unwrap();
    assert!(sandbox.stat("/data/adir").await.unwrap().is_dir());
    sandbox
        .rename("/data/async.txt", "/data/adir/async.txt")
        .await
        .unwrap();

    let entries = sandbox.readdir("/data/adir").await.unwrap();
    assert_eq!(entries.len(), 1);

    assert!(sandbox.exists("/data/adir/async.txt").await);
    sandbox.unlink("/data/adir/async.txt").await.unwrap();
    sandbox.rmdir("/data/adir").await.unwrap();
}

#[tokio::test]
async fn test_async_violation_resolves_to_err() {
    let provider = CountingFs::new();
    let sandbox = SandboxFs::filtered(provider.clone(), ["/data"], PolicyMode::Allow);

    let err = sandbox.read_file("/secret/key.txt").await.unwrap_err();
    assert_eq!(err.code(), "ENOENT");
    assert_eq!(err.errno(), 34);
    assert_eq!(err.path(), Some("/secret/key.txt"));

    let err = sandbox.rename("/data/a", "/secret/b").await.unwrap_err();
    assert_eq!(err.path(), Some("/secret/b"));

    assert!(!sandbox.exists("/secret/key.txt").await);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_async_dropped_future_observes_nothing() {
    let provider = CountingFs::new();
    let sandbox = SandboxFs::filtered(provider.clone(), ["/data"], PolicyMode::Allow);

    // a future dropped before polling delegates nothing and surfaces nothing
    drop(sandbox.read_file("/secret/key.txt"));
    drop(sandbox.write_file("/data/never.txt", b"x"));
    assert_eq!(provider.calls(), 0);
    assert!(!provider.inner().exists(Path::new("/data/never.txt")));
}
