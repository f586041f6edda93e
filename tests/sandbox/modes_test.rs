/*!
 * Creation Mode Tests
 * Caller-supplied permission modes are replaced with the fixed defaults
 */

use std::path::Path;
use std::sync::Arc;

use fs_sandbox::policy::PolicyMode;
use fs_sandbox::registry::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use fs_sandbox::sandbox::{create_filtered_sandbox, create_root_sandbox};
use fs_sandbox::vfs::{LocalFs, MemFs, OpenFlags};

#[test]
fn test_mkdir_ignores_requested_mode() {
    let provider = Arc::new(MemFs::new());
    let sandbox = create_filtered_sandbox(provider, ["/"], PolicyMode::Allow);

    sandbox.mkdir_with_mode_sync("/locked", 0).unwrap();
    let md = sandbox.stat_sync("/locked").unwrap();
    assert_eq!(md.permissions.mode, DEFAULT_DIR_MODE);
}

#[test]
fn test_write_file_ignores_requested_mode() {
    let provider = Arc::new(MemFs::new());
    let sandbox = create_filtered_sandbox(provider, ["/"], PolicyMode::Allow);

    sandbox.write_file_with_mode_sync("/w.txt", b"w", 0).unwrap();
    assert_eq!(
        sandbox.stat_sync("/w.txt").unwrap().permissions.mode,
        DEFAULT_FILE_MODE
    );

    sandbox.append_file_with_mode_sync("/a.txt", b"a", 0).unwrap();
    assert_eq!(
        sandbox.stat_sync("/a.txt").unwrap().permissions.mode,
        DEFAULT_FILE_MODE
    );
}

#[test]
fn test_open_ignores_requested_mode() {
    let provider = Arc::new(MemFs::new());
    let sandbox = create_filtered_sandbox(provider, ["/"], PolicyMode::Allow);

    let handle = sandbox
        .open_with_mode_sync("/o.txt", OpenFlags::create(), 0)
        .unwrap();
    assert_eq!(handle.stat_sync().unwrap().permissions.mode, DEFAULT_FILE_MODE);
}

#[tokio::test]
async fn test_async_creation_modes_forced() {
    let provider = Arc::new(MemFs::new());
    let sandbox = create_filtered_sandbox(provider, ["/"], PolicyMode::Allow);

    sandbox.mkdir_with_mode("/d", 0o111).await.unwrap();
    assert_eq!(
        sandbox.stat("/d").await.unwrap().permissions.mode,
        DEFAULT_DIR_MODE
    );

    sandbox.write_file_with_mode("/f", b"x", 0o400).await.unwrap();
    assert_eq!(
        sandbox.stat("/f").await.unwrap().permissions.mode,
        DEFAULT_FILE_MODE
    );

    let handle = sandbox
        .open_with_mode("/g", OpenFlags::create(), 0)
        .await
        .unwrap();
    assert_eq!(
        handle.stat().await.unwrap().permissions.mode,
        DEFAULT_FILE_MODE
    );
}

#[cfg(unix)]
#[test]
fn test_local_provider_effective_bits_nonzero() {
    use tempfile::TempDir;

    let temp = TempDir::new().unwrap();
    let provider = Arc::new(LocalFs::new());
    let sandbox = create_root_sandbox(provider, temp.path());

    // a requested mode of 0 would make these unusable; the forced defaults
    // keep effective permission bits nonzero (modulo umask)
    sandbox.mkdir_with_mode_sync("dir", 0).unwrap();
    assert_ne!(
        sandbox.stat_sync("dir").unwrap().permissions.mode & 0o777,
        0
    );

    sandbox.write_file_with_mode_sync("f.txt", b"x", 0).unwrap();
    assert_ne!(
        sandbox.stat_sync("f.txt").unwrap().permissions.mode & 0o777,
        0
    );

    sandbox.append_file_with_mode_sync("g.txt", b"x", 0).unwrap();
    assert_ne!(
        sandbox.stat_sync("g.txt").unwrap().permissions.mode & 0o777,
        0
    );

    let path = temp.path().join("dir");
    assert!(std::fs::metadata(path).unwrap().is_dir());
}
