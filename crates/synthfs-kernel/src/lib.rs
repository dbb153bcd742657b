//! # synthfs-kernel
//!
//! Core of synthfs: a statically defined directory tree held in memory,
//! with the lookup, permission and rename logic a userspace filesystem
//! bridge needs.
//!
//! The kernel knows nothing about FUSE. It takes absolute `/`-separated
//! paths and the requester's uid/gid, and answers with attributes, listings,
//! bytes, or a [`VfsError`].
//!
//! ```
//! use synthfs_kernel::{MountIdentity, Requester, SynthFs, VfsOps, default_layout};
//!
//! let fs = SynthFs::new(default_layout(), MountIdentity::new(1000, 1000));
//! let me = Requester::new(1000, 1000);
//!
//! let bytes = fs.read_all("/bar/baz/foo/test.txt", me).unwrap();
//! assert_eq!(bytes, b"hi-hi\n");
//! ```

pub mod layout;
pub mod seed;
pub mod vfs;

pub use layout::default_layout;
pub use seed::{ContentSeed, SeedError, apply_seeds};
pub use vfs::{
    Access, AccessMask, DirEntry, Descriptor, Directory, File, FileAttr, FileType, MountIdentity,
    NodeId, OpenFlags, Requester, SynthFs, VfsError, VfsOps, VfsResult,
};
