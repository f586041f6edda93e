/*!
 * In-Memory Filesystem Provider
 * Volatile backing store used as the standard test double
 */

use ahash::RandomState;
use dashmap::DashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};
use super::traits::{FileProvider, ProviderFile};
use super::types::{Entry, FileType, Metadata, OpenFlags, Permissions};

/// In-memory filesystem node.
#[derive(Debug, Clone)]
enum Node {
    File {
        data: Vec<u8>,
        permissions: Permissions,
        modified: SystemTime,
        created: SystemTime,
    },
    Directory {
        permissions: Permissions,
        created: SystemTime,
    },
}

impl Node {
    fn file(data: Vec<u8>, mode: u32) -> Self {
        let now = SystemTime::now();
        Node::File {
            data,
            permissions: Permissions::new(mode),
            modified: now,
            created: now,
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    fn file_type(&self) -> FileType {
        match self {
            Node::File { .. } => FileType::File,
            Node::Directory { .. } => FileType::Directory,
        }
    }

    fn metadata(&self) -> Metadata {
        match self {
            Node::File {
                data,
                permissions,
                modified,
                created,
            } => Metadata {
                file_type: FileType::File,
                size: data.len() as u64,
                permissions: *permissions,
                modified: *modified,
                created: *created,
            },
            Node::Directory {
                permissions,
                created,
            } => Metadata {
                file_type: FileType::Directory,
                size: 0,
                permissions: *permissions,
                modified: *created,
                created: *created,
            },
        }
    }
}

/// In-memory provider backed by a concurrent path-keyed node table.
///
/// Paths are normalized lexically (anchored at `/`, `.`/`..` collapsed) so
/// the same file is reachable under equivalent spellings. Cloning shares the
/// node table.
#[derive(Debug, Clone)]
pub struct MemFs {
    nodes: Arc<DashMap<PathBuf, Node, RandomState>>,
}

impl MemFs {
    pub fn new() -> Self {
        let nodes = DashMap::with_hasher(RandomState::new());
        nodes.insert(
            PathBuf::from("/"),
            Node::Directory {
                permissions: Permissions::new(0o755),
                created: SystemTime::now(),
            },
        );
        Self {
            nodes: Arc::new(nodes),
        }
    }

    fn normalize(path: &Path) -> PathBuf {
        let anchored = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };
        path_clean::clean(anchored)
    }

    fn not_found(path: &Path) -> VfsError {
        VfsError::NotFound {
            path: path.display().to_string(),
        }
    }

    fn ensure_parent(&self, normalized: &Path, original: &Path) -> VfsResult<()> {
        let Some(parent) = normalized.parent() else {
            return Ok(());
        };
        match self.nodes.get(parent) {
            Some(node) if node.is_dir() => Ok(()),
            Some(_) => Err(VfsError::NotADirectory {
                path: parent.display().to_string(),
            }),
            None => Err(Self::not_found(original)),
        }
    }

    fn has_children(&self, dir: &Path) -> bool {
        self.nodes
            .iter()
            .any(|entry| entry.key().parent() == Some(dir))
    }
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProvider for MemFs {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = Self::normalize(path);
        match self.nodes.get(&normalized) {
            Some(node) => match node.value() {
                Node::File { data, .. } => Ok(data.clone()),
                Node::Directory { .. } => Err(VfsError::IsADirectory {
                    path: path.display().to_string(),
                }),
            },
            None => Err(Self::not_found(path)),
        }
    }

    fn write_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        self.ensure_parent(&normalized, path)?;

        match self.nodes.get_mut(&normalized) {
            Some(mut node) => match node.value_mut() {
                // overwrite keeps the original permissions, like the host
                Node::File { data: existing, modified, .. } => {
                    *existing = data.to_vec();
                    *modified = SystemTime::now();
                    Ok(())
                }
                Node::Directory { .. } => Err(VfsError::IsADirectory {
                    path: path.display().to_string(),
                }),
            },
            None => {
                self.nodes.insert(normalized, Node::file(data.to_vec(), mode));
                Ok(())
            }
        }
    }

    fn append_file(&self, path: &Path, data: &[u8], mode: u32) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        self.ensure_parent(&normalized, path)?;

        match self.nodes.get_mut(&normalized) {
            Some(mut node) => match node.value_mut() {
                Node::File { data: existing, modified, .. } => {
                    existing.extend_from_slice(data);
                    *modified = SystemTime::now();
                    Ok(())
                }
                Node::Directory { .. } => Err(VfsError::IsADirectory {
                    path: path.display().to_string(),
                }),
            },
            None => {
                self.nodes.insert(normalized, Node::file(data.to_vec(), mode));
                Ok(())
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(&Self::normalize(path))
    }

    fn stat(&self, path: &Path) -> VfsResult<Metadata> {
        self.nodes
            .get(&Self::normalize(path))
            .map(|node| node.metadata())
            .ok_or_else(|| Self::not_found(path))
    }

    fn readdir(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let normalized = Self::normalize(path);
        match self.nodes.get(&normalized) {
            Some(node) if node.is_dir() => {}
            Some(_) => {
                return Err(VfsError::NotADirectory {
                    path: path.display().to_string(),
                })
            }
            None => return Err(Self::not_found(path)),
        }

        let mut entries: Vec<Entry> = self
            .nodes
            .iter()
            .filter(|entry| entry.key().parent() == Some(normalized.as_path()))
            .filter_map(|entry| {
                let name = entry.key().file_name()?.to_str()?.to_string();
                Some(Entry::new_unchecked(name, entry.value().file_type()))
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        if self.nodes.contains_key(&normalized) {
            return Err(VfsError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        self.ensure_parent(&normalized, path)?;
        self.nodes.insert(
            normalized,
            Node::Directory {
                permissions: Permissions::new(mode),
                created: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn rmdir(&self, path: &Path) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        if normalized == Path::new("/") {
            return Err(VfsError::InvalidArgument("cannot remove root".into()));
        }
        match self.nodes.get(&normalized) {
            Some(node) if node.is_dir() => {}
            Some(_) => {
                return Err(VfsError::NotADirectory {
                    path: path.display().to_string(),
                })
            }
            None => return Err(Self::not_found(path)),
        }
        if self.has_children(&normalized) {
            return Err(VfsError::InvalidArgument(format!(
                "directory not empty: {}",
                path.display()
            )));
        }
        self.nodes.remove(&normalized);
        Ok(())
    }

    fn unlink(&self, path: &Path) -> VfsResult<()> {
        let normalized = Self::normalize(path);
        match self.nodes.get(&normalized) {
            Some(node) if node.is_dir() => {
                return Err(VfsError::IsADirectory {
                    path: path.display().to_string(),
                })
            }
            Some(_) => {}
            None => return Err(Self::not_found(path)),
        }
        self.nodes.remove(&normalized);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        let from_norm = Self::normalize(from);
        let to_norm = Self::normalize(to);
        if !self.nodes.contains_key(&from_norm) {
            return Err(Self::not_found(from));
        }
        self.ensure_parent(&to_norm, to)?;

        // collect the subtree first so the map is not mutated mid-iteration
        let moved: Vec<(PathBuf, PathBuf)> = self
            .nodes
            .iter()
            .filter(|entry| entry.key().starts_with(&from_norm))
            .map(|entry| {
                let new = match entry.key().strip_prefix(&from_norm) {
                    Ok(rel) if rel.as_os_str().is_empty() => to_norm.clone(),
                    Ok(rel) => to_norm.join(rel),
                    Err(_) => entry.key().clone(),
                };
                (entry.key().clone(), new)
            })
            .collect();

        for (old, new) in moved {
            if let Some((_, node)) = self.nodes.remove(&old) {
                self.nodes.insert(new, node);
            }
        }
        Ok(())
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32) -> VfsResult<Box<dyn ProviderFile>> {
        flags.validate()?;
        let normalized = Self::normalize(path);

        match self.nodes.get(&normalized) {
            Some(node) if node.is_dir() => {
                return Err(VfsError::IsADirectory {
                    path: path.display().to_string(),
                })
            }
            Some(_) if flags.create_new => {
                return Err(VfsError::AlreadyExists {
                    path: path.display().to_string(),
                })
            }
            Some(_) => {}
            None if flags.will_create() => {
                self.ensure_parent(&normalized, path)?;
                self.nodes
                    .insert(normalized.clone(), Node::file(Vec::new(), mode));
            }
            None => return Err(Self::not_found(path)),
        }

        if flags.truncate {
            if let Some(mut node) = self.nodes.get_mut(&normalized) {
                if let Node::File { data, modified, .. } = node.value_mut() {
                    data.clear();
                    *modified = SystemTime::now();
                }
            }
        }

        Ok(Box::new(MemFile {
            nodes: Arc::clone(&self.nodes),
            path: normalized,
            pos: 0,
            flags,
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Open descriptor over a MemFs node.
struct MemFile {
    nodes: Arc<DashMap<PathBuf, Node, RandomState>>,
    path: PathBuf,
    pos: u64,
    flags: OpenFlags,
}

impl MemFile {
    fn size(&self) -> VfsResult<u64> {
        match self.nodes.get(&self.path) {
            Some(node) => match node.value() {
                Node::File { data, .. } => Ok(data.len() as u64),
                Node::Directory { .. } => Err(VfsError::BadDescriptor),
            },
            // node removed out from under the descriptor
            None => Err(VfsError::BadDescriptor),
        }
    }
}

impl ProviderFile for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        if !self.flags.read {
            return Err(VfsError::BadDescriptor);
        }
        match self.nodes.get(&self.path) {
            Some(node) => match node.value() {
                Node::File { data, .. } => {
                    let start = (self.pos as usize).min(data.len());
                    let n = (data.len() - start).min(buf.len());
                    buf[..n].copy_from_slice(&data[start..start + n]);
                    self.pos += n as u64;
                    Ok(n)
                }
                Node::Directory { .. } => Err(VfsError::BadDescriptor),
            },
            None => Err(VfsError::BadDescriptor),
        }
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        if !self.flags.is_writable() {
            return Err(VfsError::BadDescriptor);
        }
        match self.nodes.get_mut(&self.path) {
            Some(mut node) => match node.value_mut() {
                Node::File { data, modified, .. } => {
                    let start = if self.flags.append {
                        data.len()
                    } else {
                        self.pos as usize
                    };
                    if start + buf.len() > data.len() {
                        data.resize(start + buf.len(), 0);
                    }
                    data[start..start + buf.len()].copy_from_slice(buf);
                    *modified = SystemTime::now();
                    self.pos = (start + buf.len()) as u64;
                    Ok(buf.len())
                }
                Node::Directory { .. } => Err(VfsError::BadDescriptor),
            },
            None => Err(VfsError::BadDescriptor),
        }
    }

    fn seek(&mut self, pos: SeekFrom) -> VfsResult<u64> {
        let size = self.size()?;
        let new_pos = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        match new_pos {
            Some(p) => {
                self.pos = p;
                Ok(p)
            }
            None => Err(VfsError::InvalidArgument(
                "seek before start of file".into(),
            )),
        }
    }

    fn sync_all(&mut self) -> VfsResult<()> {
        // nothing buffered
        Ok(())
    }

    fn set_len(&mut self, size: u64) -> VfsResult<()> {
        if !self.flags.is_writable() {
            return Err(VfsError::BadDescriptor);
        }
        match self.nodes.get_mut(&self.path) {
            Some(mut node) => match node.value_mut() {
                Node::File { data, modified, .. } => {
                    data.resize(size as usize, 0);
                    *modified = SystemTime::now();
                    Ok(())
                }
                Node::Directory { .. } => Err(VfsError::BadDescriptor),
            },
            None => Err(VfsError::BadDescriptor),
        }
    }

    fn stat(&self) -> VfsResult<Metadata> {
        self.nodes
            .get(&self.path)
            .map(|node| node.metadata())
            .ok_or(VfsError::BadDescriptor)
    }

    fn chmod(&mut self, mode: u32) -> VfsResult<()> {
        match self.nodes.get_mut(&self.path) {
            Some(mut node) => match node.value_mut() {
                Node::File { permissions, .. } => {
                    *permissions = Permissions::new(mode);
                    Ok(())
                }
                Node::Directory { .. } => Err(VfsError::BadDescriptor),
            },
            None => Err(VfsError::BadDescriptor),
        }
    }

    fn chown(&mut self, _uid: Option<u32>, _gid: Option<u32>) -> VfsResult<()> {
        // MemFs tracks no ownership
        Ok(())
    }
}
