//! # synthfs-fuse
//!
//! FUSE bridge for [`synthfs_kernel`]: inode bookkeeping, the `fuser`
//! callback implementation, and mount configuration.

pub mod adapter;
pub mod config;
pub mod inode;

pub use adapter::{SynthFuse, mount, to_fuse_attr};
pub use config::{ConfigError, ContentEntry, MountConfig};
pub use inode::InodeTable;
