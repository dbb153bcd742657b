//! The descriptor tree: directories and files as one tagged type.
//!
//! A [`Directory`] owns its children outright, in insertion order. Children
//! hold no reference back to their parent, so moving a node is a matter of
//! taking it out of one `Vec` and pushing it onto another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::permission::{Access, MountIdentity};
use super::types::{FileAttr, FileType};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a node, stable across renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A node in the tree.
#[derive(Debug)]
pub enum Descriptor {
    Directory(Directory),
    File(File),
}

/// A directory and its ordered children.
#[derive(Debug)]
pub struct Directory {
    id: NodeId,
    name: String,
    access: Access,
    children: Vec<Descriptor>,
}

/// A regular file backed by an in-memory buffer.
#[derive(Debug)]
pub struct File {
    id: NodeId,
    name: String,
    access: Access,
    content: Vec<u8>,
}

impl Descriptor {
    pub fn id(&self) -> NodeId {
        match self {
            Descriptor::Directory(dir) => dir.id,
            Descriptor::File(file) => file.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Descriptor::Directory(dir) => &dir.name,
            Descriptor::File(file) => &file.name,
        }
    }

    /// Only rename calls this.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Descriptor::Directory(dir) => dir.name = name,
            Descriptor::File(file) => file.name = name,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Descriptor::Directory(dir) => dir.access,
            Descriptor::File(file) => file.access,
        }
    }

    pub fn set_access(&mut self, access: impl Into<Access>) {
        let access = access.into();
        match self {
            Descriptor::Directory(dir) => dir.access = access,
            Descriptor::File(file) => file.access = access,
        }
    }

    pub fn kind(&self) -> FileType {
        match self {
            Descriptor::Directory(_) => FileType::Directory,
            Descriptor::File(_) => FileType::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Descriptor::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Descriptor::File(_))
    }

    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Descriptor::Directory(dir) => Some(dir),
            Descriptor::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Descriptor::Directory(dir) => Some(dir),
            Descriptor::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Descriptor::File(file) => Some(file),
            Descriptor::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut File> {
        match self {
            Descriptor::File(file) => Some(file),
            Descriptor::Directory(_) => None,
        }
    }

    /// Attribute record for this node. Ownership is always `owner`, whatever
    /// the node.
    pub fn stats(&self, owner: MountIdentity, mtime: SystemTime) -> FileAttr {
        match self {
            Descriptor::Directory(dir) => FileAttr::directory(dir.access.bits(), owner, mtime),
            Descriptor::File(file) => {
                FileAttr::file(file.len() as u64, file.access.bits(), owner, mtime)
            }
        }
    }

    /// True if `id` is this node or lives anywhere beneath it.
    pub fn contains(&self, id: NodeId) -> bool {
        self.id() == id
            || self
                .as_dir()
                .is_some_and(|dir| dir.children.iter().any(|child| child.contains(id)))
    }

    /// Depth-first search for a node by id.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Descriptor> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Descriptor::Directory(dir) => dir
                .children
                .iter_mut()
                .find_map(|child| child.find_mut(id)),
            Descriptor::File(_) => None,
        }
    }
}

impl From<Directory> for Descriptor {
    fn from(dir: Directory) -> Self {
        Descriptor::Directory(dir)
    }
}

impl From<File> for Descriptor {
    fn from(file: File) -> Self {
        Descriptor::File(file)
    }
}

impl Directory {
    pub fn new(name: impl Into<String>, access: impl Into<Access>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            access: access.into(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: impl Into<Descriptor>) -> Self {
        self.add_child(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Children in display order.
    pub fn children(&self) -> &[Descriptor] {
        &self.children
    }

    /// First child called `name`. Later siblings with the same name are
    /// shadowed.
    pub fn child(&self, name: &str) -> Option<&Descriptor> {
        self.children.iter().find(|child| child.name() == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Descriptor> {
        self.children.iter_mut().find(|child| child.name() == name)
    }

    /// Append a child. Names are not checked for uniqueness.
    pub fn add_child(&mut self, child: impl Into<Descriptor>) {
        self.children.push(child.into());
    }

    /// Detach the child with the given id, handing ownership to the caller.
    /// `None` if no direct child has that id.
    pub fn remove_child(&mut self, id: NodeId) -> Option<Descriptor> {
        let index = self.children.iter().position(|child| child.id() == id)?;
        Some(self.children.remove(index))
    }
}

impl File {
    pub fn new(name: impl Into<String>, access: impl Into<Access>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            access: access.into(),
            content: Vec::new(),
        }
    }

    /// Builder form of [`write`](Self::write).
    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.write(content);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Replace the whole buffer.
    pub fn write(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    pub fn read_data(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Up to `size` bytes starting at `offset`, clamped to the buffer.
    /// Empty once `offset` reaches the end.
    pub fn read_at(&self, offset: u64, size: u32) -> &[u8] {
        let len = self.content.len() as u64;
        if offset >= len {
            return &[];
        }
        let end = offset.saturating_add(u64::from(size)).min(len);
        &self.content[offset as usize..end as usize]
    }
}
