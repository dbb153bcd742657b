//! Values passed across the operation contracts.
//!
//! Everything here is keyed by path and name; inode numbers belong to the
//! protocol adapter.

use std::time::SystemTime;

use super::permission::{AccessMask, MountIdentity};

/// The two kinds of node the tree holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

impl FileType {
    pub fn is_file(&self) -> bool {
        *self == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        *self == FileType::Directory
    }
}

/// Attributes reported for a node.
///
/// Ownership is never stored per node: `uid`/`gid` are always the mount
/// identity, and every timestamp is the moment the tree was mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttr {
    /// Content length for files, 0 for directories.
    pub size: u64,
    pub kind: FileType,
    /// Permission bits, 0o000..=0o777.
    pub perm: u16,
    pub mtime: SystemTime,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
}

impl FileAttr {
    pub fn file(size: u64, perm: u16, owner: MountIdentity, mtime: SystemTime) -> Self {
        Self::build(FileType::File, size, perm, owner, mtime)
    }

    pub fn directory(perm: u16, owner: MountIdentity, mtime: SystemTime) -> Self {
        Self::build(FileType::Directory, 0, perm, owner, mtime)
    }

    fn build(
        kind: FileType,
        size: u64,
        perm: u16,
        owner: MountIdentity,
        mtime: SystemTime,
    ) -> Self {
        Self {
            size,
            kind,
            perm,
            mtime,
            // a directory is linked from its parent and from its own "."
            nlink: if kind.is_dir() { 2 } else { 1 },
            uid: owner.uid,
            gid: owner.gid,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// One line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Leaf name, never a path.
    pub name: String,
    pub kind: FileType,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// `.`, the listed directory itself.
    pub fn current() -> Self {
        Self::new(".", FileType::Directory)
    }

    /// `..`, the listed directory's parent.
    pub fn parent() -> Self {
        Self::new("..", FileType::Directory)
    }
}

/// Access mode of an open request, decoded from `O_ACCMODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
}

impl OpenFlags {
    pub const fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }

    pub const fn read() -> Self {
        Self::new(true, false)
    }

    pub const fn write() -> Self {
        Self::new(false, true)
    }

    pub const fn read_write() -> Self {
        Self::new(true, true)
    }

    /// Decode the access mode of raw `open(2)` flags.
    ///
    /// An `O_ACCMODE` value other than `O_RDONLY`, `O_WRONLY` or `O_RDWR`
    /// requests nothing, and an empty request is always denied.
    pub fn from_raw(flags: i32) -> Self {
        match flags & libc::O_ACCMODE {
            libc::O_RDONLY => Self::read(),
            libc::O_WRONLY => Self::write(),
            libc::O_RDWR => Self::read_write(),
            _ => Self::default(),
        }
    }

    /// Permission bits the open needs.
    ///
    /// Any open that writes is checked for write alone, so `O_RDWR` on a
    /// write-only file is allowed. Only a pure read is checked for read.
    pub fn requested(&self) -> AccessMask {
        match (self.read, self.write) {
            (_, true) => AccessMask::WRITE,
            (true, false) => AccessMask::READ,
            (false, false) => AccessMask::NONE,
        }
    }
}
