//! The tree compiled into the binary.
//!
//! ```text
//! /            0755
//! └─ bar       0755
//!    └─ baz    0744
//!       ├─ bin        0177
//!       ├─ readme.txt 0544
//!       ├─ example    0544
//!       └─ foo        0711
//!          ├─ cp       0444
//!          └─ test.txt 0444
//! ```

use crate::vfs::{Descriptor, Directory, File, ROOT_PATH};

const README_TEXT: &str = "\
This tree lives entirely in memory.

Browse it with ls, read it with cat, move things around with mv.
Nothing is written to disk and everything is gone after unmount.
";

const TEST_TEXT: &str = "hi-hi\n";

/// Build a fresh copy of the default tree.
pub fn default_layout() -> Descriptor {
    let foo = Directory::new("foo", 0o711)
        .with_child(File::new("cp", 0o444))
        .with_child(File::new("test.txt", 0o444).with_content(TEST_TEXT));

    let baz = Directory::new("baz", 0o744)
        .with_child(Directory::new("bin", 0o177))
        .with_child(File::new("readme.txt", 0o544).with_content(README_TEXT))
        .with_child(File::new("example", 0o544))
        .with_child(foo);

    Directory::new(ROOT_PATH, 0o755)
        .with_child(Directory::new("bar", 0o755).with_child(baz))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::resolve;

    #[test]
    fn test_every_path_resolves() {
        let root = default_layout();
        for (path, is_dir, mode) in [
            ("/", true, 0o755),
            ("/bar", true, 0o755),
            ("/bar/baz", true, 0o744),
            ("/bar/baz/bin", true, 0o177),
            ("/bar/baz/readme.txt", false, 0o544),
            ("/bar/baz/example", false, 0o544),
            ("/bar/baz/foo", true, 0o711),
            ("/bar/baz/foo/cp", false, 0o444),
            ("/bar/baz/foo/test.txt", false, 0o444),
        ] {
            let node = resolve(&root, path).unwrap_or_else(|| panic!("{path} missing"));
            assert_eq!(node.is_dir(), is_dir, "{path}");
            assert_eq!(node.access().bits(), mode, "{path}");
        }
    }

    #[test]
    fn test_seeded_text() {
        let root = default_layout();
        let test_txt = resolve(&root, "/bar/baz/foo/test.txt").unwrap();
        assert_eq!(test_txt.as_file().unwrap().read_data(), b"hi-hi\n");

        let example = resolve(&root, "/bar/baz/example").unwrap();
        assert!(example.as_file().unwrap().is_empty());
    }
}
