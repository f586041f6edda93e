/*!
 * Local Filesystem Provider
 * Wraps std::fs for host filesystem access
 */

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::SystemTime;

use log::trace;

use super::error::{VfsError, VfsResult};
use super::traits::{FileProvider, ProviderFile};
use super::types::{Entry, FileType, Metadata, OpenFlags, Permissions};

/// Host filesystem provider over `std::fs`.
///
/// Paths are used exactly as handed down by the facade; all policy and
/// root-resolution work happens before this layer.
#[derive(Debug, Clone, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }

    /// Map `std::io::Error` onto the stable error variants, keeping the
    /// caller's path string in the payload.
    fn io_error(e: std::io::Error, path: &Path) -> VfsError {
        use std::io::ErrorKind;
        let display = path.display().to_string();
        match e.kind() {
            ErrorKind::NotFound => VfsError::NotFound { path: display },
            ErrorKind::PermissionDenied => VfsError::PermissionDenied { path: display },
            ErrorKind::AlreadyExists => VfsError::AlreadyExists { path: display },
            ErrorKind::InvalidInput => VfsError::InvalidArgument(display),
            _ => match e.raw_os_error() {
                Some(20) => VfsError::NotADirectory { path: display },
                Some(21) => VfsError::IsADirectory { path: display },
                _ => VfsError::Io(format!("{display}: {e}")),
            },
        }
    }

    fn convert_file_type(ft: fs::FileType) -> FileType {
        if ft.is_dir() {
            FileType::Directory
        } else if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_file() {
            FileType::File
        } else {
            FileType::Unknown
        }
    }

    fn convert_metadata(md: &fs::Metadata) -> Metadata {
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            md.permissions().mode()
        };
        #[cfg(not(unix))]
        let mode = if md.permissions().readonly() {
            0o444
        } else {
            0o644
        };

        Metadata {
            file_type: Self::convert_file_type(md.file_type()),
            size: md.len(),
            permissions: Permissions::new(mode),
            modified: md.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            created: md.created().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    fn open_options(flags: OpenFlags, mode: u32) -> fs::OpenOptions {
        let mut options = fs::OpenOptions::new();
        options.read(flags.read);
        options.write(flags.write);
        options.append(flags.append);
        options.truncate(flags.truncate);
        options.create(flags.create);
        options.create_new(flags.create_new);

        #[cfg(unix)]
        if flags.will_create() {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        options
    }
}

impl FileProvider for LocalFs {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        fs::read(path).map_err(|e| Self::io_error(e, path))
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        let mut flags = OpenFlags::create();
        flags.truncate = true;
        let mut file = Self::open_options(flags, mode)
            .open(path)
            .map_err(|e| Self::io_error(e, path))?;
        file.write_all(data).map_err(|e| Self::io_error(e, path))
    }

    fn append_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        let mut flags = OpenFlags::append_only();
        flags.create = true;
        let mut file = Self::open_options(flags, mode)
            .open(path)
            .map_err(|e| Self::io_error(e, path))?;
        file.write_all(data).map_err(|e| Self::io_error(e, path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn stat(&self, path: &Path) -> VfsResult<Metadata> {
        let md = fs::metadata(path).map_err(|e| Self::io_error(e, path))?;
        Ok(Self::convert_metadata(&md))
    }

    fn readdir(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let entries = fs::read_dir(path).map_err(|e| Self::io_error(e, path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(e, path))?;
            let name = entry.file_name().into_string().map_err(|name| {
                VfsError::InvalidArgument(format!("non-UTF-8 filename: {name:?}"))
            })?;
            let file_type = entry.file_type().map_err(|e| Self::io_error(e, path))?;
            result.push(Entry::new_unchecked(name, Self::convert_file_type(file_type)));
        }

        Ok(result)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> VfsResult<()> {
        trace!("localfs: mkdir {} mode {:o}", path.display(), mode);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new()
                .mode(mode)
                .create(path)
                .map_err(|e| Self::io_error(e, path))
        }
        #[cfg(not(unix))]
        {
            let _ = mode;
            fs::create_dir(path).map_err(|e| Self::io_error(e, path))
        }
    }

    fn rmdir(&self, path: &Path) -> VfsResult<()> {
        fs::remove_dir(path).map_err(|e| Self::io_error(e, path))
    }

    fn unlink(&self, path: &Path) -> VfsResult<()> {
        fs::remove_file(path).map_err(|e| Self::io_error(e, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        fs::rename(from, to).map_err(|e| Self::io_error(e, from))
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> VfsResult<Box<dyn ProviderFile>> {
        flags.validate()?;
        let file = Self::open_options(flags, mode)
            .open(path)
            .map_err(|e| Self::io_error(e, path))?;
        Ok(Box::new(LocalFile { file }))
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Open host file descriptor.
struct LocalFile {
    file: fs::File,
}

impl LocalFile {
    fn io_error(e: std::io::Error) -> VfsError {
        match e.raw_os_error() {
            Some(9) => VfsError::BadDescriptor,
            _ => VfsError::Io(e.to_string()),
        }
    }
}

impl ProviderFile for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        self.file.read(buf).map_err(Self::io_error)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        self.file.write(buf).map_err(Self::io_error)
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        self.file.seek(pos).map_err(Self::io_error)
    }

    fn sync_all(&mut self) -> VfsResult<()> {
        self.file.sync_all().map_err(Self::io_error)
    }

    fn set_len(&mut self, size: u64) -> VfsResult<()> {
        self.file.set_len(size).map_err(Self::io_error)
    }

    fn stat(&self) -> VfsResult<Metadata> {
        let md = self.file.metadata().map_err(Self::io_error)?;
        Ok(LocalFs::convert_metadata(&md))
    }

    fn chmod(&mut self, mode: u32) -> VfsResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            self.file
                .set_permissions(fs::Permissions::from_mode(mode))
                .map_err(Self::io_error)
        }
        #[cfg(not(unix))]
        {
            let mut perms = self.file.metadata().map_err(Self::io_error)?.permissions();
            perms.set_readonly(mode & 0o222 == 0);
            self.file.set_permissions(perms).map_err(Self::io_error)
        }
    }

    fn chown(&mut self, uid: Option<u32>, gid: Option<u32>) -> VfsResult<()> {
        #[cfg(unix)]
        {
            use nix::unistd::{fchown, Gid, Uid};
            use std::os::fd::AsRawFd;
            fchown(
                self.file.as_raw_fd(),
                uid.map(Uid::from_raw),
                gid.map(Gid::from_raw),
            )
            .map_err(|e| VfsError::Io(format!("fchown: {e}")))
        }
        #[cfg(not(unix))]
        {
            let _ = (uid, gid);
            Err(VfsError::InvalidArgument(
                "ownership changes are unsupported on this platform".into(),
            ))
        }
    }
}
