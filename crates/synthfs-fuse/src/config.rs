//! Mount configuration.
//!
//! Loaded from an optional TOML file; command-line flags are layered on top
//! by the binary.
//!
//! ```toml
//! fs_name = "synthfs"
//! uid = 1000
//! auto_unmount = false
//! attr_ttl_secs = 1
//!
//! [[content]]
//! path = "/bar/baz/example"
//! source = "./example.bin"
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fuser::MountOption;
use serde::Deserialize;
use synthfs_kernel::{ContentSeed, MountIdentity};
use thiserror::Error;

pub const DEFAULT_FS_NAME: &str = "synthfs";
pub const DEFAULT_ATTR_TTL_SECS: u64 = 1;

/// Failure loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("content path must be absolute: {0}")]
    RelativeContentPath(String),
}

/// One `[[content]]` table: seed `path` in the tree from host file `source`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentEntry {
    pub path: String,
    pub source: PathBuf,
}

impl From<ContentSeed> for ContentEntry {
    fn from(seed: ContentSeed) -> Self {
        Self {
            path: seed.target,
            source: seed.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    /// Name shown as the mount source.
    #[serde(default = "default_fs_name")]
    pub fs_name: String,

    /// Owner uid of every node. Defaults to the mounting process.
    #[serde(default)]
    pub uid: Option<u32>,

    /// Owner gid of every node. Defaults to the mounting process.
    #[serde(default)]
    pub gid: Option<u32>,

    #[serde(default)]
    pub allow_other: bool,

    /// Unmount when the process exits. fuser turns this into an
    /// `allow_other` mount unless `allow_other` is already set, which needs
    /// `user_allow_other` in /etc/fuse.conf for non-root users.
    #[serde(default)]
    pub auto_unmount: bool,

    /// Let the kernel keep file pages cached across opens.
    #[serde(default = "default_true")]
    pub kernel_cache: bool,

    #[serde(default = "default_attr_ttl_secs")]
    pub attr_ttl_secs: u64,

    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

fn default_fs_name() -> String {
    DEFAULT_FS_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_attr_ttl_secs() -> u64 {
    DEFAULT_ATTR_TTL_SECS
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            fs_name: default_fs_name(),
            uid: None,
            gid: None,
            allow_other: false,
            auto_unmount: false,
            kernel_cache: true,
            attr_ttl_secs: DEFAULT_ATTR_TTL_SECS,
            content: Vec::new(),
        }
    }
}

impl MountConfig {
    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if let Some(entry) = config.content.iter().find(|e| !e.path.starts_with('/')) {
            return Err(ConfigError::RelativeContentPath(entry.path.clone()));
        }
        Ok(config)
    }

    /// Owner of the tree: configured ids, falling back to the current process.
    pub fn identity(&self) -> MountIdentity {
        let current = MountIdentity::current();
        MountIdentity::new(
            self.uid.unwrap_or(current.uid),
            self.gid.unwrap_or(current.gid),
        )
    }

    pub fn attr_ttl(&self) -> Duration {
        Duration::from_secs(self.attr_ttl_secs)
    }

    pub fn seeds(&self) -> Vec<ContentSeed> {
        self.content
            .iter()
            .map(|entry| ContentSeed::new(entry.path.clone(), entry.source.clone()))
            .collect()
    }

    pub fn mount_options(&self) -> Vec<MountOption> {
        let mut options = vec![MountOption::FSName(self.fs_name.clone())];
        if self.auto_unmount {
            options.push(MountOption::AutoUnmount);
        }
        if self.allow_other {
            options.push(MountOption::AllowOther);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = MountConfig::from_toml_str("").unwrap();
        assert_eq!(config, MountConfig::default());
        assert!(config.kernel_cache);
        assert!(!config.auto_unmount);
        assert_eq!(config.attr_ttl(), Duration::from_secs(1));
    }

    #[test]
    fn test_identity_override() {
        let config = MountConfig {
            uid: Some(42),
            gid: Some(7),
            ..Default::default()
        };
        assert_eq!(config.identity(), MountIdentity::new(42, 7));

        let partial = MountConfig {
            gid: Some(7),
            ..Default::default()
        };
        let identity = partial.identity();
        assert_eq!(identity.uid, MountIdentity::current().uid);
        assert_eq!(identity.gid, 7);
    }

    #[test]
    fn test_mount_options() {
        let config = MountConfig::default();
        assert_eq!(
            config.mount_options(),
            [MountOption::FSName("synthfs".into())]
        );

        let config = MountConfig {
            fs_name: "scratch".into(),
            auto_unmount: true,
            allow_other: true,
            ..Default::default()
        };
        assert_eq!(
            config.mount_options(),
            [
                MountOption::FSName("scratch".into()),
                MountOption::AutoUnmount,
                MountOption::AllowOther
            ]
        );
    }

    #[test]
    fn test_rejects_relative_content_path() {
        let err = MountConfig::from_toml_str(
            r#"
            [[content]]
            path = "bar/baz/example"
            source = "x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::RelativeContentPath(_)));
    }

    #[test]
    fn test_seed_roundtrip_through_entry() {
        let seed: ContentSeed = "/bar/baz/example=/tmp/x".parse().unwrap();
        let config = MountConfig {
            content: vec![seed.clone().into()],
            ..Default::default()
        };
        assert_eq!(config.seeds(), [seed]);
    }
}
