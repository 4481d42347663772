//! Sandbox resolution
//!
//! Turns a guest path relative to a descriptor into a host path that is
//! guaranteed to sit under the descriptor's real root.
//!
//! ## Steps
//!
//! 1. reject top-level absolute guest paths and paths holding a NUL
//! 2. join the path onto the descriptor's normalized virtual root and
//!    normalize the result
//! 3. check the normalized candidate is still inside the virtual root
//! 4. swap the virtual root prefix for the descriptor's real path
//! 5. walk the components beneath the root and read each one as a link; on
//!    the first link found, splice its target into the path and go back to
//!    step 2
//!
//! Every directory component is walked, whatever the lookup flags say, since
//! the host kernel follows those links on its own. The final component is
//! only walked when following was asked for or the path ends in a separator.
//! Step 3 runs again after every link hop, so a link can never carry the
//! lookup out of the sandbox, no matter where it was created or moved to. The
//! number of hops is bounded by [`MAX_SYMLINK_FOLLOWS`].

use crate::interface::{self, Errno, Lookupflags};
use crate::safewasi::filesystem::{combine_paths, is_absolute_path, normalize_path};
use crate::safewasi::syscalls::fs_constants::{LOOKUP_SYMLINK_FOLLOW, MAX_SYMLINK_FOLLOWS};

/// The part of a descriptor the resolver needs: where its subtree lives for
/// the guest and where it lives on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxRoot<'a> {
    pub normalized_path: &'a str,
    pub real_path: &'a str,
}

fn is_dot_root(root: &str) -> bool {
    root == "." || root == "./"
}

fn starts_with_dotdot(path: &str) -> bool {
    path == ".." || path.starts_with("../")
}

/// Containment test of a normalized `path` against a normalized `root`.
///
/// Absolute roots use a plain prefix match. A `.` root admits anything that
/// does not start by climbing out with `..`. Any other relative root needs
/// the prefix and a remainder that does not climb out.
pub fn is_path_sandboxed(path: &str, root: &str) -> bool {
    if is_absolute_path(root) {
        return path.starts_with(root);
    }

    if is_dot_root(root) {
        return !starts_with_dotdot(path);
    }

    let rest = match path.strip_prefix(root) {
        Some(rest) => rest,
        None => return false,
    };
    if rest.len() < 2 {
        return true;
    }

    let rest = rest.strip_prefix('/').unwrap_or(rest);
    !starts_with_dotdot(rest)
}

// length of the virtual prefix swapped out for the real path
fn virtual_root_len(root: &SandboxRoot) -> usize {
    if is_dot_root(root.normalized_path) {
        0
    } else {
        root.normalized_path.len()
    }
}

/// End offsets, within `path`, of every named component past `start`,
/// each paired with whether it is the last one.
fn component_ends(path: &str, start: usize) -> Vec<(usize, bool)> {
    let mut ends = Vec::new();
    let mut offset = start;
    for segment in path.get(start..).unwrap_or("").split('/') {
        offset += segment.len();
        if !segment.is_empty() && segment != "." {
            ends.push(offset);
        }
        offset += 1;
    }

    let count = ends.len();
    ends.into_iter()
        .enumerate()
        .map(|(i, end)| (end, i + 1 == count))
        .collect()
}

// link target with the components that came after the link put back on
fn splice_link(link_path: &str, target: &str, rest: &str) -> Result<String, Errno> {
    let mut spliced = if is_absolute_path(target) {
        let mut owned = String::new();
        owned.try_reserve(target.len() + rest.len()).map_err(|_| Errno::ENOMEM)?;
        owned.push_str(target);
        owned
    } else {
        let parent = combine_paths(link_path, "..")?;
        let mut joined = combine_paths(&parent, target)?;
        joined.try_reserve(rest.len()).map_err(|_| Errno::ENOMEM)?;
        joined
    };
    spliced.push_str(rest);
    Ok(spliced)
}

/// Normalizes a path that already carries the root prefix (an absolute link
/// target, or a relative target joined onto the link's directory) and checks
/// containment.
fn normalize_anchored_path(root: &SandboxRoot, path: &str) -> Result<String, Errno> {
    let normalized = normalize_path(path)?;
    if !is_path_sandboxed(&normalized, root.normalized_path) {
        return Err(Errno::ENOTCAPABLE);
    }
    Ok(normalized)
}

/// An absolute path only makes sense against an absolute root.
pub(crate) fn normalize_absolute_path(root: &SandboxRoot, path: &str) -> Result<String, Errno> {
    if !is_absolute_path(root.normalized_path) {
        return Err(Errno::ENOTCAPABLE);
    }
    normalize_anchored_path(root, path)
}

pub(crate) fn normalize_relative_path(root: &SandboxRoot, path: &str) -> Result<String, Errno> {
    let combined = combine_paths(root.normalized_path, path)?;
    normalize_anchored_path(root, &combined)
}

/// Checks that a symlink created at `link_path` with contents `target`
/// would stay inside `root` when followed. Absolute targets are refused
/// outright with `EPERM`.
pub fn verify_symlink_target(root: &SandboxRoot, link_path: &str, target: &str) -> Result<(), Errno> {
    if is_absolute_path(target) {
        return Err(Errno::EPERM);
    }
    if target.contains('\0') {
        return Err(Errno::EINVAL);
    }

    let link = normalize_relative_path(root, link_path)?;
    let parent = combine_paths(&link, "..")?;
    let followed = combine_paths(&parent, target)?;
    normalize_anchored_path(root, &followed)?;
    Ok(())
}

/// Maps a normalized, contained virtual path onto the host. The virtual
/// root prefix is replaced by the real path.
pub fn resolve_path_to_host(root: &SandboxRoot, path: &str) -> Result<String, Errno> {
    let fake_len = virtual_root_len(root);
    let stripped = path.get(fake_len..).ok_or(Errno::ENOTCAPABLE)?;

    let mut resolved = String::new();
    resolved
        .try_reserve(root.real_path.len() + stripped.len() + 1)
        .map_err(|_| Errno::ENOMEM)?;
    resolved.push_str(root.real_path);

    if stripped.len() > 1 || (stripped.len() == 1 && !stripped.starts_with('/')) {
        if !stripped.starts_with('/') {
            resolved.push('/');
        }
        resolved.push_str(stripped);
    }

    #[cfg(windows)]
    {
        let (real, rest) = resolved.split_at(root.real_path.len());
        resolved = format!("{}{}", real, rest.replace('/', "\\"));
    }

    Ok(resolved)
}

/// Resolves guest `path` under `root` to a verified host path.
///
/// Symlinks in directory components are always chased. A final symlink is
/// chased with [`LOOKUP_SYMLINK_FOLLOW`] in `flags`, or when `path` ends in a
/// separator, and otherwise left for the caller to act on (or refuse with
/// `O_NOFOLLOW`). Each hop is checked for containment again. A path that
/// does not exist yet resolves fine, callers may be about to create it.
///
/// ### Errors
///
/// * `ENOTCAPABLE` - `path` is absolute or escapes the root, directly or
///   through a link
/// * `EINVAL` - `path` holds a NUL byte
/// * `ELOOP` - more than `MAX_SYMLINK_FOLLOWS - 1` links on the way
/// * `ENOMEM` - path buffers could not be allocated
/// * anything the host reports while reading a link, translated
pub fn resolve_path(root: &SandboxRoot, path: &str, flags: Lookupflags) -> Result<String, Errno> {
    if is_absolute_path(path) {
        return Err(Errno::ENOTCAPABLE);
    }

    let follow_final = flags & LOOKUP_SYMLINK_FOLLOW != 0;
    let mut input = path.to_string();
    let mut anchored = false;
    let mut follow_count = 0;

    'resolve: loop {
        if input.contains('\0') {
            return Err(Errno::EINVAL);
        }

        let normalized = if is_absolute_path(&input) {
            normalize_absolute_path(root, &input)?
        } else if anchored {
            normalize_anchored_path(root, &input)?
        } else {
            normalize_relative_path(root, &input)?
        };

        //the host follows a final link behind a trailing separator even with O_NOFOLLOW
        let check_final = follow_final || normalized.ends_with('/');

        for (end, is_final) in component_ends(&normalized, virtual_root_len(root)) {
            if is_final && !check_final {
                break;
            }

            let link_path = &normalized[..end];
            let host_path = resolve_path_to_host(root, link_path)?;
            let target = match interface::readlink(&host_path) {
                Ok(target) => target,
                Err(e) => match interface::translate_io_error(&e) {
                    Errno::EINVAL => continue,
                    //nothing further down exists yet
                    Errno::ENOENT | Errno::ENOTDIR => break,
                    errno => return Err(errno),
                },
            };

            follow_count += 1;
            if follow_count >= MAX_SYMLINK_FOLLOWS {
                return Err(Errno::ELOOP);
            }

            anchored = !is_absolute_path(&target);
            input = splice_link(link_path, &target, &normalized[end..])?;
            continue 'resolve;
        }

        return resolve_path_to_host(root, &normalized);
    }
}
