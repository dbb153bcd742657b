//! Path resolution by walking the tree from the root.
//!
//! Paths are absolute and `/`-separated. Each component is matched against
//! the current directory's children in order; the first match wins.

use super::descriptor::Descriptor;

/// Path of the root directory.
pub const ROOT_PATH: &str = "/";

/// Path separator.
pub const SEPARATOR: char = '/';

/// Find the node at `path`. `None` for missing components, for a path that
/// continues past a file, or for a root that is not a directory.
pub fn resolve<'a>(root: &'a Descriptor, path: &str) -> Option<&'a Descriptor> {
    if path == ROOT_PATH {
        return Some(root);
    }
    root.as_dir()?;
    walk(root, &components(path))
}

/// Mutable twin of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Descriptor, path: &str) -> Option<&'a mut Descriptor> {
    if path == ROOT_PATH {
        return Some(root);
    }
    root.as_dir()?;
    walk_mut(root, &components(path))
}

/// Split `path` into its parent path and leaf name.
///
/// ```
/// use synthfs_kernel::vfs::split_path;
///
/// assert_eq!(split_path("/bar/baz/example"), ("/bar/baz", "example"));
/// assert_eq!(split_path("/bar"), ("/", "bar"));
/// assert_eq!(split_path("bar"), ("/", "bar"));
/// ```
pub fn split_path(path: &str) -> (&str, &str) {
    if path == ROOT_PATH {
        return (ROOT_PATH, path);
    }
    match path.rfind(SEPARATOR) {
        None => (ROOT_PATH, path),
        Some(0) => (ROOT_PATH, &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
    }
}

/// Join a directory path and a child name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

// One leading and one trailing separator are dropped, so "/a/b/" walks a, b.
fn components(path: &str) -> Vec<&str> {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    let path = path.strip_suffix(SEPARATOR).unwrap_or(path);
    path.split(SEPARATOR).collect()
}

fn walk<'a>(node: &'a Descriptor, tokens: &[&str]) -> Option<&'a Descriptor> {
    let Some((token, rest)) = tokens.split_first() else {
        return Some(node);
    };
    // a file with components left over fails in the next step's as_dir()
    let child = node.as_dir()?.child(token)?;
    walk(child, rest)
}

fn walk_mut<'a>(node: &'a mut Descriptor, tokens: &[&str]) -> Option<&'a mut Descriptor> {
    let Some((token, rest)) = tokens.split_first() else {
        return Some(node);
    };
    let child = node.as_dir_mut()?.child_mut(token)?;
    walk_mut(child, rest)
}
