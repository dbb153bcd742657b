//! Errors surfaced by tree operations.
//!
//! Each variant carries the path it was raised for, and maps onto exactly
//! one errno so the protocol adapter never has to guess.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
    /// A path component is missing, or the path runs through a file.
    #[error("{0}: no such file or directory")]
    NotFound(String),

    /// The requester's permission triplet does not grant the access.
    #[error("{0}: access denied")]
    PermissionDenied(String),

    /// Listing something that is a file.
    #[error("{0}: not a directory")]
    NotADirectory(String),

    /// Opening or reading something that is a directory.
    #[error("{0}: is a directory")]
    IsADirectory(String),

    /// Rename target lies inside the node being moved.
    #[error("{0}: invalid argument")]
    InvalidPath(String),
}

impl VfsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Path the error was raised for.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(path)
            | Self::PermissionDenied(path)
            | Self::NotADirectory(path)
            | Self::IsADirectory(path)
            | Self::InvalidPath(path) => path,
        }
    }

    /// Errno carried by a failed FUSE reply.
    pub fn to_errno(&self) -> i32 {
        match self {
            Self::NotFound(_) => libc::ENOENT,
            Self::PermissionDenied(_) => libc::EACCES,
            Self::NotADirectory(_) => libc::ENOTDIR,
            Self::IsADirectory(_) => libc::EISDIR,
            Self::InvalidPath(_) => libc::EINVAL,
        }
    }
}

pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(VfsError::not_found("/x").to_errno(), libc::ENOENT);
        assert_eq!(VfsError::permission_denied("/x").to_errno(), libc::EACCES);
        assert_eq!(VfsError::not_a_directory("/x").to_errno(), libc::ENOTDIR);
        assert_eq!(VfsError::is_a_directory("/x").to_errno(), libc::EISDIR);
        assert_eq!(VfsError::invalid_path("/x").to_errno(), libc::EINVAL);
    }

    #[test]
    fn test_path_accessor() {
        assert_eq!(VfsError::invalid_path("/a/b").path(), "/a/b");
        assert_eq!(VfsError::not_found("/").path(), "/");
    }
}
