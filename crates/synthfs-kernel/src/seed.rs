//! One-shot content seeding from host files.
//!
//! Before mounting, selected files of the tree can have their bytes replaced
//! with the contents of a file on the host. This is the only point where the
//! host filesystem is touched.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::vfs::{Descriptor, resolve_mut};

/// Failure while seeding content.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Argument not of the form `VPATH=HOSTFILE`.
    #[error("malformed content seed {0:?}: expected VPATH=HOSTFILE")]
    Malformed(String),

    /// Target path does not resolve in the tree.
    #[error("seed target not found: {0}")]
    NotFound(String),

    /// Target path resolves to a directory.
    #[error("seed target is a directory: {0}")]
    IsADirectory(String),

    /// Host file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replace the content of `target` with the bytes of `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSeed {
    /// Absolute path inside the tree.
    pub target: String,
    /// Host file to read.
    pub source: PathBuf,
}

impl ContentSeed {
    pub fn new(target: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}

impl FromStr for ContentSeed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, source) = s
            .split_once('=')
            .ok_or_else(|| SeedError::Malformed(s.to_string()))?;
        if !target.starts_with('/') || source.is_empty() {
            return Err(SeedError::Malformed(s.to_string()));
        }
        Ok(Self::new(target, source))
    }
}

/// Apply every seed in order. Later seeds for the same target win.
pub fn apply_seeds(root: &mut Descriptor, seeds: &[ContentSeed]) -> Result<(), SeedError> {
    for seed in seeds {
        let bytes = read_host(&seed.source)?;
        let node = resolve_mut(root, &seed.target)
            .ok_or_else(|| SeedError::NotFound(seed.target.clone()))?;
        let file = node
            .as_file_mut()
            .ok_or_else(|| SeedError::IsADirectory(seed.target.clone()))?;
        debug!(path = %seed.target, source = %seed.source.display(), len = bytes.len(), "seeded");
        file.write(bytes);
    }
    Ok(())
}

fn read_host(path: &Path) -> Result<Vec<u8>, SeedError> {
    std::fs::read(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_layout;
    use crate::vfs::resolve;
    use std::io::Write;

    #[test]
    fn test_parse_seed() {
        let seed: ContentSeed = "/bar/baz/example=./payload.bin".parse().unwrap();
        assert_eq!(seed.target, "/bar/baz/example");
        assert_eq!(seed.source, PathBuf::from("./payload.bin"));

        assert!(matches!(
            "no-equals".parse::<ContentSeed>(),
            Err(SeedError::Malformed(_))
        ));
        assert!(matches!(
            "relative=./x".parse::<ContentSeed>(),
            Err(SeedError::Malformed(_))
        ));
        assert!(matches!(
            "/bar/baz/example=".parse::<ContentSeed>(),
            Err(SeedError::Malformed(_))
        ));
    }

    #[test]
    fn test_apply_seed_replaces_content() {
        let mut host = tempfile::NamedTempFile::new().unwrap();
        host.write_all(b"#!/bin/sh\necho seeded\n").unwrap();

        let mut root = default_layout();
        apply_seeds(
            &mut root,
            &[ContentSeed::new("/bar/baz/example", host.path())],
        )
        .unwrap();

        let example = resolve(&root, "/bar/baz/example").unwrap();
        assert_eq!(
            example.as_file().unwrap().read_data(),
            b"#!/bin/sh\necho seeded\n"
        );
    }

    #[test]
    fn test_apply_seed_errors() {
        let host = tempfile::NamedTempFile::new().unwrap();
        let mut root = default_layout();

        let missing = apply_seeds(&mut root, &[ContentSeed::new("/bar/nope", host.path())]);
        assert!(matches!(missing, Err(SeedError::NotFound(_))));

        let dir = apply_seeds(&mut root, &[ContentSeed::new("/bar/baz", host.path())]);
        assert!(matches!(dir, Err(SeedError::IsADirectory(_))));

        let unreadable = apply_seeds(
            &mut root,
            &[ContentSeed::new("/bar/baz/example", "/definitely/not/here")],
        );
        assert!(matches!(unreadable, Err(SeedError::Read { .. })));
    }
}
