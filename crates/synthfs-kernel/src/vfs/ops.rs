//! The operations a protocol adapter can drive against the tree.

use super::permission::Requester;
use super::types::{DirEntry, FileAttr, OpenFlags};
use super::VfsResult;

/// Path-addressed filesystem operations.
///
/// Paths are absolute and `/`-separated. Access-checked calls take the
/// credentials of the process that issued the request. Implementations are
/// shared between the adapter's worker threads.
pub trait VfsOps: Send + Sync {
    /// Attributes of the node at `path`. Nobody is denied a stat.
    fn getattr(&self, path: &str) -> VfsResult<FileAttr>;

    /// `.`, `..`, then every child in insertion order. Needs read on the
    /// directory.
    fn readdir(&self, path: &str, requester: Requester) -> VfsResult<Vec<DirEntry>>;

    /// Decide whether a file may be opened with `flags`. Every requested
    /// bit must be granted; directories are refused outright.
    fn open(&self, path: &str, flags: OpenFlags, requester: Requester) -> VfsResult<()>;

    /// Up to `size` bytes from `offset`, short at end of file and empty past
    /// it. Needs read on the file.
    fn read(&self, path: &str, offset: u64, size: u32, requester: Requester)
    -> VfsResult<Vec<u8>>;

    /// Move the node at `from` to `to`, keeping its identity. Not
    /// access-checked, and an existing sibling named like the target is
    /// left in place.
    fn rename(&self, from: &str, to: &str) -> VfsResult<()>;

    /// True when `path` resolves.
    fn exists(&self, path: &str) -> bool {
        self.getattr(path).is_ok()
    }

    /// The whole file in one read.
    fn read_all(&self, path: &str, requester: Requester) -> VfsResult<Vec<u8>> {
        let attr = self.getattr(path)?;
        let size = u32::try_from(attr.size).unwrap_or(u32::MAX);
        self.read(path, 0, size, requester)
    }
}
