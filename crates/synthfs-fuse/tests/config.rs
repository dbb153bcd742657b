//! Config files on disk, through to a seeded tree.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use synthfs_fuse::{ConfigError, MountConfig};
use synthfs_kernel::vfs::resolve;
use synthfs_kernel::{SeedError, apply_seeds, default_layout};

fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let host = write_temp(b"payload\n");
    let toml = format!(
        r#"
        fs_name = "scratch"
        uid = 1234
        gid = 5678
        allow_other = true
        auto_unmount = true
        kernel_cache = false
        attr_ttl_secs = 30

        [[content]]
        path = "/bar/baz/example"
        source = "{}"
        "#,
        host.path().display()
    );
    let file = write_temp(toml.as_bytes());

    let config = MountConfig::load(file.path()).unwrap();
    assert_eq!(config.fs_name, "scratch");
    assert_eq!(config.identity().uid, 1234);
    assert_eq!(config.identity().gid, 5678);
    assert!(config.allow_other);
    assert!(config.auto_unmount);
    assert!(!config.kernel_cache);
    assert_eq!(config.attr_ttl(), Duration::from_secs(30));

    let mut root = default_layout();
    apply_seeds(&mut root, &config.seeds()).unwrap();
    let example = resolve(&root, "/bar/baz/example").unwrap();
    assert_eq!(example.as_file().unwrap().read_data(), b"payload\n");
}

#[test]
fn test_missing_file() {
    let err = MountConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_unknown_key_rejected() {
    let file = write_temp(b"kernel_cahce = false\n");
    let err = MountConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_wrong_type_rejected() {
    let file = write_temp(b"uid = \"root\"\n");
    assert!(matches!(
        MountConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_seed_into_directory_fails_at_startup() {
    let host = write_temp(b"x");
    let toml = format!(
        "[[content]]\npath = \"/bar/baz/foo\"\nsource = \"{}\"\n",
        host.path().display()
    );
    let config = MountConfig::from_toml_str(&toml).unwrap();

    let mut root = default_layout();
    let err = apply_seeds(&mut root, &config.seeds()).unwrap_err();
    assert!(matches!(err, SeedError::IsADirectory(_)));
}
