//! The in-memory tree and the operations served over it.
//!
//! Pieces:
//!
//! - [`Descriptor`] - Directory or file node; directories own their children
//! - [`resolve`] - Walks a `/`-separated path from the root
//! - [`MountIdentity`] - Owner/group/other permission evaluation
//! - [`VfsOps`] - Operation contracts a protocol adapter drives
//! - [`SynthFs`] - The tree plus its identity, behind one lock
//!
//! ## Design Decisions
//!
//! - **Paths in, paths out**: nothing here allocates inode numbers; the
//!   FUSE adapter keeps its own inode ↔ path table.
//! - **No parent pointers**: rename re-resolves both parent directories from
//!   the root rather than following a back-reference.
//! - **First match wins**: sibling names are not unique, and lookup always
//!   takes the earliest child with a matching name.

mod descriptor;
mod error;
mod fs;
mod ops;
mod permission;
mod resolve;
mod types;

pub use descriptor::{Descriptor, Directory, File, NodeId};
pub use error::{VfsError, VfsResult};
pub use fs::SynthFs;
pub use ops::VfsOps;
pub use permission::{Access, AccessMask, Bucket, MountIdentity, Requester};
pub use resolve::{ROOT_PATH, SEPARATOR, join_path, resolve, resolve_mut, split_path};
pub use types::{DirEntry, FileAttr, FileType, OpenFlags};
