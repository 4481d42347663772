//! Lexical path handling
//!
//! Everything here is string algebra over guest paths. No call in this module
//! touches the host filesystem, so `normalize_path("a/../b")` is `"b"` whether
//! or not `a` exists or is a symlink.
//!
//! ## Normalized form
//!
//! - `.` segments and empty segments are dropped
//! - a `..` segment removes the segment before it, or is kept when there is
//!   nothing left to remove (a leading run of `..`)
//! - an absolute path stays absolute and `..` never climbs past its `/`
//! - an empty result is `/` for absolute input and `.` otherwise
//! - a trailing separator on the input survives
//!
//! Guest paths always use `/`. On Windows hosts `\` is also accepted as a
//! separator on input; output only ever contains `/`.

use crate::interface::Errno;

#[cfg(not(windows))]
pub fn is_slash(c: char) -> bool {
    c == '/'
}

#[cfg(windows)]
pub fn is_slash(c: char) -> bool {
    c == '/' || c == '\\'
}

// guests only generate unix style paths
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/')
}

/// Joins two paths with a single `/`. The result is not normalized.
pub fn combine_paths(path1: &str, path2: &str) -> Result<String, Errno> {
    let mut combined = String::new();
    combined
        .try_reserve(path1.len() + path2.len() + 1)
        .map_err(|_| Errno::ENOMEM)?;
    combined.push_str(path1);
    combined.push('/');
    combined.push_str(path2);
    Ok(combined)
}

/// Lexically normalizes `path`. See the module docs for the rules.
pub fn normalize_path(path: &str) -> Result<String, Errno> {
    let is_absolute = is_absolute_path(path);
    let has_trailing_slash = path.chars().next_back().map_or(false, is_slash);

    // the output is never longer than the input, bar the "." for ""
    let mut out = String::new();
    out.try_reserve(path.len() + 1).map_err(|_| Errno::ENOMEM)?;

    let mut segments = path.split(is_slash).peekable();
    while let Some(segment) = segments.next() {
        let more = segments.peek().is_some();

        match segment {
            "" => {
                if out.is_empty() && more && is_absolute {
                    out.push('/');
                }
            }
            "." => {}
            ".." => {
                let last = out.rfind('/').unwrap_or(0);

                if out.is_empty() || out == ".." || out.ends_with("/..") {
                    if !out.is_empty() && !out.ends_with('/') {
                        out.push('/');
                    }
                    out.push_str("..");
                } else if last == 0 && out.starts_with('/') {
                    //never strip the root itself
                    out.truncate(1);
                } else {
                    out.truncate(last);
                }
            }
            _ => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(segment);
            }
        }
    }

    if out.is_empty() {
        out.push(if is_absolute { '/' } else { '.' });
    }

    if has_trailing_slash && !out.ends_with('/') {
        out.push('/');
    }

    Ok(out)
}

/// Same as [`normalize_path`] for callers that hand over a fixed size
/// buffer. Input longer than `limit` fails with `ENOBUFS`.
pub fn normalize_path_with_limit(path: &str, limit: usize) -> Result<String, Errno> {
    if path.len() > limit {
        return Err(Errno::ENOBUFS);
    }
    normalize_path(path)
}

/// Normalized form of a descriptor's own path, as used for sandbox prefix
/// checks. Any trailing separator is dropped so `"/var/"` and `"/var"` root
/// the same subtree.
pub fn normalize_root_path(path: &str) -> Result<String, Errno> {
    let mut normalized = normalize_path(path)?;
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    Ok(normalized)
}
