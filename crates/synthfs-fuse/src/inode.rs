//! Inode ↔ path mapping.
//!
//! The kernel crate is path-based; FUSE speaks inode numbers. Inodes are
//! handed out the first time a path is seen by `lookup` or `readdir` and
//! stay stable until a rename moves or shadows the path.

use std::collections::HashMap;

use fuser::FUSE_ROOT_ID;
use synthfs_kernel::vfs::{ROOT_PATH, join_path, split_path};

/// Bidirectional inode table.
#[derive(Debug)]
pub struct InodeTable {
    /// inode -> path
    inodes: HashMap<u64, String>,
    /// path -> inode
    paths: HashMap<String, u64>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// A table holding only the root.
    pub fn new() -> Self {
        let mut inodes = HashMap::new();
        let mut paths = HashMap::new();
        inodes.insert(FUSE_ROOT_ID, ROOT_PATH.to_string());
        paths.insert(ROOT_PATH.to_string(), FUSE_ROOT_ID);

        Self {
            inodes,
            paths,
            next_inode: FUSE_ROOT_ID + 1,
        }
    }

    pub fn path(&self, ino: u64) -> Option<&str> {
        self.inodes.get(&ino).map(String::as_str)
    }

    pub fn ino(&self, path: &str) -> Option<u64> {
        self.paths.get(path).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.inodes.len()
    }

    /// Inode bound to `path`, allocating one if the path is new.
    pub fn get_or_alloc(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.paths.get(path) {
            return ino;
        }

        let ino = self.next_inode;
        self.next_inode += 1;
        self.inodes.insert(ino, path.to_string());
        self.paths.insert(path.to_string(), ino);
        ino
    }

    /// Path of `name` inside the directory bound to `parent`.
    pub fn child_path(&self, parent: u64, name: &str) -> Option<String> {
        self.path(parent).map(|dir| join_path(dir, name))
    }

    /// Inode of the directory containing `ino`. The root is its own parent.
    pub fn parent_ino(&mut self, ino: u64) -> Option<u64> {
        let path = self.path(ino)?;
        if path == ROOT_PATH {
            return Some(FUSE_ROOT_ID);
        }
        let (parent, _) = split_path(path);
        let parent = parent.to_string();
        Some(self.get_or_alloc(&parent))
    }

    /// Re-key `from` and everything below it to live under `to`.
    ///
    /// When `to` is already bound, an earlier sibling owns that name and
    /// every path under it, so the moved subtree is forgotten instead.
    pub fn rename(&mut self, from: &str, to: &str) {
        if self.paths.contains_key(to) {
            self.forget(from);
            return;
        }
        for (old, ino) in self.detach(from) {
            let new = format!("{to}{}", &old[from.len()..]);
            self.paths.insert(new.clone(), ino);
            self.inodes.insert(ino, new);
        }
    }

    /// Drop `path` and every binding below it.
    pub fn forget(&mut self, path: &str) {
        self.detach(path);
    }

    fn detach(&mut self, from: &str) -> Vec<(String, u64)> {
        let prefix = format!("{from}/");
        let moved: Vec<(String, u64)> = self
            .paths
            .iter()
            .filter(|(path, _)| path.as_str() == from || path.starts_with(&prefix))
            .map(|(path, &ino)| (path.clone(), ino))
            .collect();
        for (path, ino) in &moved {
            self.paths.remove(path);
            self.inodes.remove(ino);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_preallocated() {
        let table = InodeTable::new();
        assert_eq!(table.path(FUSE_ROOT_ID), Some("/"));
        assert_eq!(table.ino("/"), Some(FUSE_ROOT_ID));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_or_alloc_is_stable() {
        let mut table = InodeTable::new();
        let bar = table.get_or_alloc("/bar");
        let baz = table.get_or_alloc("/bar/baz");
        assert_ne!(bar, baz);
        assert_ne!(bar, FUSE_ROOT_ID);
        assert_eq!(table.get_or_alloc("/bar"), bar);
        assert_eq!(table.path(baz), Some("/bar/baz"));
    }

    #[test]
    fn test_child_and_parent() {
        let mut table = InodeTable::new();
        assert_eq!(table.child_path(FUSE_ROOT_ID, "bar").as_deref(), Some("/bar"));

        let baz = table.get_or_alloc("/bar/baz");
        assert_eq!(
            table.child_path(baz, "foo").as_deref(),
            Some("/bar/baz/foo")
        );
        let bar = table.parent_ino(baz).unwrap();
        assert_eq!(table.path(bar), Some("/bar"));
        assert_eq!(table.parent_ino(bar), Some(FUSE_ROOT_ID));
        assert_eq!(table.parent_ino(FUSE_ROOT_ID), Some(FUSE_ROOT_ID));
        assert_eq!(table.parent_ino(9999), None);
    }

    #[test]
    fn test_rename_moves_subtree() {
        let mut table = InodeTable::new();
        let foo = table.get_or_alloc("/bar/baz/foo");
        let test_txt = table.get_or_alloc("/bar/baz/foo/test.txt");
        let sibling = table.get_or_alloc("/bar/baz/foobar");

        table.rename("/bar/baz/foo", "/moved");

        assert_eq!(table.path(foo), Some("/moved"));
        assert_eq!(table.path(test_txt), Some("/moved/test.txt"));
        assert_eq!(table.ino("/bar/baz/foo"), None);
        // prefix match is per component
        assert_eq!(table.path(sibling), Some("/bar/baz/foobar"));
    }

    #[test]
    fn test_rename_keeps_existing_binding() {
        let mut table = InodeTable::new();
        let readme = table.get_or_alloc("/bar/baz/readme.txt");
        let example = table.get_or_alloc("/bar/baz/example");

        table.rename("/bar/baz/example", "/bar/baz/readme.txt");

        assert_eq!(table.ino("/bar/baz/readme.txt"), Some(readme));
        assert_eq!(table.path(example), None);
        assert_eq!(table.ino("/bar/baz/example"), None);
    }

    #[test]
    fn test_rename_behind_sibling_forgets_subtree() {
        let mut table = InodeTable::new();
        let bin = table.get_or_alloc("/bar/baz/bin");
        let foo = table.get_or_alloc("/bar/baz/foo");
        let test_txt = table.get_or_alloc("/bar/baz/foo/test.txt");

        table.rename("/bar/baz/foo", "/bar/baz/bin");

        assert_eq!(table.ino("/bar/baz/bin"), Some(bin));
        assert_eq!(table.path(foo), None);
        assert_eq!(table.path(test_txt), None);
        assert_eq!(table.ino("/bar/baz/bin/test.txt"), None);
        assert_eq!(table.ino("/bar/baz/foo/test.txt"), None);
    }

    #[test]
    fn test_forget_drops_subtree() {
        let mut table = InodeTable::new();
        let foo = table.get_or_alloc("/bar/baz/foo");
        let cp = table.get_or_alloc("/bar/baz/foo/cp");
        let foobar = table.get_or_alloc("/bar/baz/foobar");

        table.forget("/bar/baz/foo");

        assert_eq!(table.path(foo), None);
        assert_eq!(table.path(cp), None);
        assert_eq!(table.path(foobar), Some("/bar/baz/foobar"));
    }
}
