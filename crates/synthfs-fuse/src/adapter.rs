//! FUSE adapter.
//!
//! Maps `fuser` callbacks onto the path-based [`VfsOps`] contract. The
//! adapter owns the inode table; everything else lives in [`SynthFs`].

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fuser::consts::FOPEN_KEEP_CACHE;
use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, Request,
};
use libc::{EINVAL, ENOENT, ENOTDIR, c_int};
use synthfs_kernel::vfs::{self, VfsError, VfsOps};
use synthfs_kernel::{OpenFlags, Requester, SynthFs};
use tracing::{debug, info, trace};

use crate::config::MountConfig;
use crate::inode::InodeTable;

const BLOCK_SIZE: u32 = 512;

/// `fuser::Filesystem` over a shared [`SynthFs`].
pub struct SynthFuse {
    fs: Arc<SynthFs>,
    inodes: InodeTable,
    attr_ttl: Duration,
    kernel_cache: bool,
}

impl SynthFuse {
    pub fn new(fs: Arc<SynthFs>, config: &MountConfig) -> Self {
        Self {
            fs,
            inodes: InodeTable::new(),
            attr_ttl: config.attr_ttl(),
            kernel_cache: config.kernel_cache,
        }
    }

    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    fn path(&self, ino: u64) -> Result<String, c_int> {
        self.inodes.path(ino).map(str::to_string).ok_or(ENOENT)
    }

    // Names that are not UTF-8 cannot exist in the tree.
    fn child_path(&self, parent: u64, name: &OsStr) -> Result<String, c_int> {
        let name = name.to_str().ok_or(ENOENT)?;
        self.inodes.child_path(parent, name).ok_or(ENOENT)
    }

    fn open_flags(&self) -> u32 {
        if self.kernel_cache { FOPEN_KEEP_CACHE } else { 0 }
    }

    /// Resolve `path` and bind an inode to it.
    pub fn lookup_path(&mut self, path: &str) -> Result<FileAttr, c_int> {
        let attr = self.fs.getattr(path).map_err(|e| errno("lookup", &e))?;
        let ino = self.inodes.get_or_alloc(path);
        Ok(to_fuse_attr(&attr, ino))
    }

    /// Move `from` to `to` in the tree and keep the inode table in step.
    ///
    /// If `to` already names a node, that node keeps winning lookups, so the
    /// moved subtree loses its inodes rather than taking over the name.
    pub fn rename_paths(&mut self, from: &str, to: &str) -> Result<(), c_int> {
        let shadowed = self.fs.exists(to);
        self.fs.rename(from, to).map_err(|e| errno("rename", &e))?;
        if shadowed {
            self.inodes.forget(from);
        } else {
            self.inodes.rename(from, to);
        }
        Ok(())
    }

    /// Directory listing with inode numbers, `.` and `..` first.
    pub fn list(
        &mut self,
        ino: u64,
        requester: Requester,
    ) -> Result<Vec<(u64, FileType, String)>, c_int> {
        let path = self.path(ino)?;
        let entries = self
            .fs
            .readdir(&path, requester)
            .map_err(|e| errno("readdir", &e))?;

        let mut listing = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry_ino = match entry.name.as_str() {
                "." => ino,
                ".." => self.inodes.parent_ino(ino).ok_or(ENOENT)?,
                name => self.inodes.get_or_alloc(&vfs::join_path(&path, name)),
            };
            listing.push((entry_ino, to_fuse_kind(entry.kind), entry.name));
        }
        Ok(listing)
    }
}

fn requester(req: &Request<'_>) -> Requester {
    Requester::new(req.uid(), req.gid())
}

fn errno(op: &str, err: &VfsError) -> c_int {
    debug!(op, path = err.path(), errno = err.to_errno(), "request failed");
    err.to_errno()
}

fn to_fuse_kind(kind: vfs::FileType) -> FileType {
    match kind {
        vfs::FileType::File => FileType::RegularFile,
        vfs::FileType::Directory => FileType::Directory,
    }
}

/// Convert kernel attributes to the FUSE wire form.
pub fn to_fuse_attr(attr: &vfs::FileAttr, ino: u64) -> FileAttr {
    FileAttr {
        ino,
        size: attr.size,
        blocks: attr.size.div_ceil(u64::from(BLOCK_SIZE)),
        atime: attr.mtime,
        mtime: attr.mtime,
        ctime: attr.mtime,
        crtime: attr.mtime,
        kind: to_fuse_kind(attr.kind),
        perm: attr.perm,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: BLOCK_SIZE,
        flags: 0,
    }
}

impl Filesystem for SynthFuse {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!(identity = ?self.fs.identity(), "synthfs mounted");
        Ok(())
    }

    fn destroy(&mut self) {
        info!(inodes = self.inodes.len(), "synthfs unmounted");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        trace!(parent, ?name, "lookup");
        let result = self
            .child_path(parent, name)
            .and_then(|path| self.lookup_path(&path));
        match result {
            Ok(attr) => reply.entry(&self.attr_ttl, &attr, 0),
            Err(code) => reply.error(code),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!(ino, "getattr");
        let path = match self.path(ino) {
            Ok(path) => path,
            Err(code) => return reply.error(code),
        };
        match self.fs.getattr(&path) {
            Ok(attr) => reply.attr(&self.attr_ttl, &to_fuse_attr(&attr, ino)),
            Err(e) => reply.error(errno("getattr", &e)),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        trace!(ino, "opendir");
        let path = match self.path(ino) {
            Ok(path) => path,
            Err(code) => return reply.error(code),
        };
        match self.fs.getattr(&path) {
            Ok(attr) if attr.is_dir() => reply.opened(0, 0),
            Ok(_) => reply.error(ENOTDIR),
            Err(e) => reply.error(errno("opendir", &e)),
        }
    }

    fn readdir(
        &mut self,
        req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!(ino, offset, "readdir");
        let listing = match self.list(ino, requester(req)) {
            Ok(listing) => listing,
            Err(code) => return reply.error(code),
        };

        let skip = usize::try_from(offset).unwrap_or(0);
        for (i, (entry_ino, kind, name)) in listing.into_iter().enumerate().skip(skip) {
            // true means the reply buffer is full
            if reply.add(entry_ino, (i + 1) as i64, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!(ino, flags, "open");
        let path = match self.path(ino) {
            Ok(path) => path,
            Err(code) => return reply.error(code),
        };
        match self.fs.open(&path, OpenFlags::from_raw(flags), requester(req)) {
            Ok(()) => reply.opened(0, self.open_flags()),
            Err(e) => reply.error(errno("open", &e)),
        }
    }

    fn read(
        &mut self,
        req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!(ino, offset, size, "read");
        let Ok(offset) = u64::try_from(offset) else {
            return reply.error(EINVAL);
        };
        let path = match self.path(ino) {
            Ok(path) => path,
            Err(code) => return reply.error(code),
        };
        match self.fs.read(&path, offset, size, requester(req)) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(errno("read", &e)),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        trace!(parent, ?name, newparent, ?newname, "rename");
        let paths = self
            .child_path(parent, name)
            .and_then(|from| Ok((from, self.child_path(newparent, newname)?)));
        let (from, to) = match paths {
            Ok(paths) => paths,
            Err(code) => return reply.error(code),
        };
        match self.rename_paths(&from, &to) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }
}

/// Mount `fs` at `mountpoint` and serve requests until it is unmounted.
pub fn mount(fs: Arc<SynthFs>, mountpoint: &Path, config: &MountConfig) -> io::Result<()> {
    let options = config.mount_options();
    info!(mountpoint = %mountpoint.display(), ?options, "mounting");
    fuser::mount2(SynthFuse::new(fs, config), mountpoint, &options)
}
