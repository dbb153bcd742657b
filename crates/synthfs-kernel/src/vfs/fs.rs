//! The mounted filesystem: one tree, one identity, one lock.

use parking_lot::RwLock;
use std::time::SystemTime;
use tracing::{debug, trace};

use super::descriptor::Descriptor;
use super::error::{VfsError, VfsResult};
use super::ops::VfsOps;
use super::permission::{AccessMask, MountIdentity, Requester};
use super::resolve::{resolve, split_path};
use super::types::{DirEntry, FileAttr, OpenFlags};

/// An in-memory tree served under a single [`MountIdentity`].
///
/// The whole tree sits behind one `RwLock`. Lookups, listings and reads take
/// the read side; `rename` holds the write side from its first lookup to the
/// final insert, so nobody observes a node that has left one directory but
/// not yet arrived in the other.
pub struct SynthFs {
    root: RwLock<Descriptor>,
    identity: MountIdentity,
    mounted_at: SystemTime,
}

impl std::fmt::Debug for SynthFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthFs")
            .field("root", &"<locked>")
            .field("identity", &self.identity)
            .field("mounted_at", &self.mounted_at)
            .finish()
    }
}

impl SynthFs {
    /// Take ownership of a fully built tree.
    pub fn new(root: Descriptor, identity: MountIdentity) -> Self {
        Self {
            root: RwLock::new(root),
            identity,
            mounted_at: SystemTime::now(),
        }
    }

    pub fn identity(&self) -> MountIdentity {
        self.identity
    }

    /// Run `f` against the tree under the read lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&Descriptor) -> R) -> R {
        f(&self.root.read())
    }

    fn check(
        &self,
        node: &Descriptor,
        requested: AccessMask,
        requester: Requester,
        path: &str,
    ) -> VfsResult<()> {
        if self
            .identity
            .authorize_all(requested, node.access(), requester)
        {
            Ok(())
        } else {
            trace!(
                path,
                uid = requester.uid,
                gid = requester.gid,
                requested = requested.bits(),
                access = ?node.access(),
                "access denied"
            );
            Err(VfsError::permission_denied(path))
        }
    }
}

impl VfsOps for SynthFs {
    fn getattr(&self, path: &str) -> VfsResult<FileAttr> {
        let root = self.root.read();
        let node = resolve(&root, path).ok_or_else(|| VfsError::not_found(path))?;
        Ok(node.stats(self.identity, self.mounted_at))
    }

    fn readdir(&self, path: &str, requester: Requester) -> VfsResult<Vec<DirEntry>> {
        let root = self.root.read();
        let node = resolve(&root, path).ok_or_else(|| VfsError::not_found(path))?;
        let dir = node
            .as_dir()
            .ok_or_else(|| VfsError::not_a_directory(path))?;
        self.check(node, AccessMask::READ, requester, path)?;

        let mut entries = Vec::with_capacity(dir.children().len() + 2);
        entries.push(DirEntry::current());
        entries.push(DirEntry::parent());
        entries.extend(
            dir.children()
                .iter()
                .map(|child| DirEntry::new(child.name(), child.kind())),
        );
        Ok(entries)
    }

    fn open(&self, path: &str, flags: OpenFlags, requester: Requester) -> VfsResult<()> {
        let root = self.root.read();
        let node = resolve(&root, path).ok_or_else(|| VfsError::not_found(path))?;
        if node.is_dir() {
            return Err(VfsError::is_a_directory(path));
        }
        self.check(node, flags.requested(), requester, path)
    }

    fn read(
        &self,
        path: &str,
        offset: u64,
        size: u32,
        requester: Requester,
    ) -> VfsResult<Vec<u8>> {
        let root = self.root.read();
        let node = resolve(&root, path).ok_or_else(|| VfsError::not_found(path))?;
        let file = node
            .as_file()
            .ok_or_else(|| VfsError::is_a_directory(path))?;
        self.check(node, AccessMask::READ, requester, path)?;
        Ok(file.read_at(offset, size).to_vec())
    }

    fn rename(&self, from: &str, to: &str) -> VfsResult<()> {
        let (from_parent, _) = split_path(from);
        let (to_parent, new_name) = split_path(to);

        let mut root = self.root.write();

        let source_parent = resolve(&root, from_parent)
            .filter(|node| node.is_dir())
            .map(Descriptor::id)
            .ok_or_else(|| VfsError::not_found(from_parent))?;
        let dest_parent = resolve(&root, to_parent)
            .filter(|node| node.is_dir())
            .map(Descriptor::id)
            .ok_or_else(|| VfsError::not_found(to_parent))?;
        let source = resolve(&root, from).ok_or_else(|| VfsError::not_found(from))?;
        let source_id = source.id();

        if source_id == root.id() {
            return Err(VfsError::not_found(from));
        }
        if source.contains(dest_parent) {
            return Err(VfsError::invalid_path(to));
        }

        let mut node = root
            .find_mut(source_parent)
            .and_then(Descriptor::as_dir_mut)
            .and_then(|dir| dir.remove_child(source_id))
            .ok_or_else(|| VfsError::not_found(from))?;

        // dest_parent is outside the detached subtree, so it is still in the tree
        match root.find_mut(dest_parent).and_then(Descriptor::as_dir_mut) {
            Some(dir) => {
                node.set_name(new_name);
                dir.add_child(node);
            }
            None => {
                if let Some(dir) = root.find_mut(source_parent).and_then(Descriptor::as_dir_mut) {
                    dir.add_child(node);
                }
                return Err(VfsError::not_found(to_parent));
            }
        }

        debug!(from, to, "renamed");
        Ok(())
    }
}
