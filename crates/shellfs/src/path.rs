// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pure helpers over slash-separated paths. No I/O.

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

/// Non-empty components of a path, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|part| !part.is_empty())
}

/// Joins `segments` into one absolute path, dropping empty and `.`
/// components and resolving `..` against what came before. A `..` that
/// would climb above the root is dropped.
pub fn normalize<S: AsRef<str>>(segments: &[S]) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in segments {
        for part in self::segments(segment.as_ref()) {
            match part {
                "." => {}
                ".." => {
                    _ = stack.pop();
                }
                name => stack.push(name),
            }
        }
    }
    if stack.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", stack.join("/"))
    }
}

/// Shorthand for normalizing a single path.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    normalize(&[path])
}

/// Concatenates `segments` with `/`. Unlike [`normalize`], `.` and `..`
/// are kept as-is. The result is absolute iff the first segment is.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let absolute = segments
        .first()
        .is_some_and(|first| first.as_ref().starts_with(SEPARATOR));
    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|segment| self::segments(segment.as_ref()))
        .collect();
    let body = parts.join("/");
    if absolute {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// The shortest relative walk from `from` to `to`; `"."` when they match.
#[must_use]
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize_path(from);
    let to = normalize_path(to);
    let from_parts: Vec<&str> = segments(&from).collect();
    let to_parts: Vec<&str> = segments(&to).collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut walk = vec![".."; from_parts.len() - common];
    walk.extend(&to_parts[common..]);
    if walk.is_empty() {
        ".".to_string()
    } else {
        walk.join("/")
    }
}

/// Pieces of a path, as returned by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Always `/`: every stored path is absolute.
    pub root: String,
    /// The normalized path.
    pub full: String,
    /// Last component, including any extension; empty for the root.
    pub base: String,
    /// `base` without its extension.
    pub name: String,
    /// Text after the last `.` of `base` (without the dot); empty if none.
    pub extension: String,
}

#[must_use]
pub fn parse(path: &str) -> ParsedPath {
    let full = normalize_path(path);
    let base = basename(&full).unwrap_or_default();
    let (name, extension) = split_extension(&base);
    ParsedPath {
        root: ROOT.to_string(),
        name: name.to_string(),
        extension: extension.to_string(),
        base: base.clone(),
        full,
    }
}

/// Splits `notes.txt` into `("notes", "txt")`. Dot files have no extension.
#[must_use]
pub fn split_extension(base: &str) -> (&str, &str) {
    match base.rfind('.') {
        None | Some(0) => (base, ""),
        Some(dot) => (&base[..dot], &base[dot + 1..]),
    }
}

/// Last component of the normalized path; `None` for the root.
#[must_use]
pub fn basename(path: &str) -> Option<String> {
    segments(&normalize_path(path)).last().map(str::to_string)
}

/// Parent of the normalized path; `None` for the root.
#[must_use]
pub fn dirname(path: &str) -> Option<String> {
    let full = normalize_path(path);
    if full == ROOT {
        return None;
    }
    match full.rsplit_once(SEPARATOR) {
        Some(("", _)) | None => Some(ROOT.to_string()),
        Some((parent, _)) => Some(parent.to_string()),
    }
}

/// True iff `child`'s parent is `candidate`.
#[must_use]
pub fn parent_of(candidate: &str, child: &str) -> bool {
    dirname(child).is_some_and(|parent| parent == normalize_path(candidate))
}

/// True iff `path` lies strictly below `ancestor`.
#[must_use]
pub fn is_descendant(ancestor: &str, path: &str) -> bool {
    let ancestor = normalize_path(ancestor);
    let path = normalize_path(path);
    if path == ancestor {
        return false;
    }
    ancestor == ROOT || path.starts_with(&format!("{ancestor}/"))
}

/// Number of components; 0 for the root.
#[must_use]
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// Moves `path` from under `from` to under `to`. Paths outside `from` are
/// returned normalized but otherwise unchanged.
#[must_use]
pub fn rebase(path: &str, from: &str, to: &str) -> String {
    let path = normalize_path(path);
    let from = normalize_path(from);
    if path == from {
        return normalize_path(to);
    }
    if !is_descendant(&from, &path) {
        return path;
    }
    let suffix = relative(&from, &path);
    normalize(&[to, suffix.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [&str; 9] = [
        "/",
        "/a",
        "/a/b/c",
        "/home/alice/notes.txt",
        "/home/bob",
        "/etc",
        "/etc/motd",
        "/a/b/d/e",
        "/x/.hidden",
    ];

    #[test]
    fn test_normalize_collapses_components() {
        assert_eq!(normalize(&["/a/./b//c/"]), "/a/b/c");
        assert_eq!(normalize(&["/a/b", "../c"]), "/a/c");
        assert_eq!(normalize(&["a", "b"]), "/a/b");
        assert_eq!(normalize(&["/../../x"]), "/x");
        assert_eq!(normalize(&["", "."]), "/");
        assert_eq!(normalize::<&str>(&[]), "/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for sample in SAMPLES.iter().chain(&["a//b/../c", "./x/./y/..", "/../.."]) {
            let once = normalize_path(sample);
            assert_eq!(normalize_path(&once), once, "{sample}");
        }
    }

    #[test]
    fn test_join_keeps_parent_components() {
        assert_eq!(join(&["/a", "../b"]), "/a/../b");
        assert_eq!(join(&["a/", "/b", ""]), "a/b");
        assert_eq!(join(&["/", "etc"]), "/etc");
        assert_eq!(join::<&str>(&[]), ".");
    }

    #[test]
    fn test_relative_round_trips() {
        for from in SAMPLES {
            for to in SAMPLES {
                let walk = relative(from, to);
                assert_eq!(normalize(&[from, walk.as_str()]), to, "{from} -> {to} via {walk}");
            }
        }
        assert_eq!(relative("/a/b", "/a/b"), ".");
        assert_eq!(relative("/a/b/c", "/a/d"), "../../d");
        assert_eq!(relative("/", "/etc/motd"), "etc/motd");
    }

    #[test]
    fn test_parse() {
        let parsed = parse("/home/alice/../alice/notes.txt");
        assert_eq!(parsed.root, "/");
        assert_eq!(parsed.full, "/home/alice/notes.txt");
        assert_eq!(parsed.base, "notes.txt");
        assert_eq!(parsed.name, "notes");
        assert_eq!(parsed.extension, "txt");

        let hidden = parse("/home/alice/.profile");
        assert_eq!(hidden.name, ".profile");
        assert_eq!(hidden.extension, "");

        let root = parse("/");
        assert_eq!(root.base, "");
        assert_eq!(root.full, "/");
    }

    #[test]
    fn test_dirname_and_basename() {
        assert_eq!(dirname("/"), None);
        assert_eq!(dirname("/etc"), Some("/".to_string()));
        assert_eq!(dirname("/etc/motd/"), Some("/etc".to_string()));
        assert_eq!(basename("/etc/motd"), Some("motd".to_string()));
        assert_eq!(basename("/"), None);
    }

    #[test]
    fn test_parent_of() {
        assert!(parent_of("/", "/etc"));
        assert!(parent_of("/etc", "/etc/motd"));
        assert!(parent_of("/etc/", "/etc/./motd"));
        assert!(!parent_of("/", "/etc/motd"));
        assert!(!parent_of("/etc", "/etc"));
        assert!(!parent_of("/", "/"));
    }

    #[test]
    fn test_descendants_and_rebase() {
        assert!(is_descendant("/a", "/a/b/c"));
        assert!(is_descendant("/", "/a"));
        assert!(!is_descendant("/a", "/a"));
        assert!(!is_descendant("/a", "/ab"));
        assert_eq!(rebase("/a/b/c", "/a", "/x"), "/x/b/c");
        assert_eq!(rebase("/a", "/a", "/x/y"), "/x/y");
        assert_eq!(rebase("/other", "/a", "/x"), "/other");
        assert_eq!(depth("/"), 0);
        assert_eq!(depth("/a/b"), 2);
    }
}
