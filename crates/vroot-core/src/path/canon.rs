//! Guest-path canonicalization honoring bindings during traversal.

use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

use vroot_common::constants::{PATH_MAX, SYMLINK_LIMIT};
use vroot_common::error::{Result, VrootError};
use vroot_common::types::{Comparison, Finality, Side};

use crate::path::translate::detranslate_path;
use crate::path::{compare_paths, join_paths, next_component, pop_component};
use crate::tracee::Tracee;

/// Borrows a byte path as [`std::path::Path`] for host syscalls.
pub(crate) fn as_host_path(bytes: &[u8]) -> &Path {
    Path::new(OsStr::from_bytes(bytes))
}

/// Resolves `user_path` into an absolute, canonical, symlink-free guest
/// path in `result`.
///
/// When `user_path` is relative, `result` must already hold its absolute
/// canonical guest base; an absolute `user_path` resets `result` to `/`.
/// Bindings are substituted at every traversal step, so a symlink is read
/// where the guest actually sees it, and its target is canonicalized in
/// turn. A final symlink component is dereferenced unless `deref_final`
/// is false and the path carries no trailing separator, matching what
/// `lstat(2)`-like syscalls expect.
///
/// # Errors
///
/// - [`VrootError::NameTooLong`] for an oversized component or path;
/// - [`VrootError::NoEntry`] when a non-final component does not exist;
/// - [`VrootError::NotADirectory`] when a non-final component, or a
///   component a trailing separator points at, is not a directory;
/// - [`VrootError::TooManyLinks`] when the symlink limit is exceeded;
/// - [`VrootError::InvalidPath`] when a relative `user_path` comes with a
///   relative base;
/// - any host error from `readlink(2)`, surfaced as-is.
pub fn canonicalize(
    tracee: &Tracee,
    user_path: &[u8],
    deref_final: bool,
    result: &mut Vec<u8>,
    depth: u32,
) -> Result<()> {
    // Bail out on circular links.
    if depth > SYMLINK_LIMIT {
        return Err(VrootError::TooManyLinks);
    }

    if user_path.first() == Some(&b'/') {
        result.clear();
        result.push(b'/');
    } else if result.first() != Some(&b'/') {
        // A relative path needs an absolute base, otherwise something
        // like ".." could not be handled.
        return Err(VrootError::InvalidPath);
    }

    let mut cursor = user_path;
    let mut want_dir = false;
    let mut is_final = false;
    while !is_final {
        let (component, finality) = next_component(&mut cursor)?;
        is_final = finality.is_final();
        if finality == Finality::FinalSlash {
            want_dir = true;
        }

        // An empty component can only mean end of input.
        if component.is_empty() {
            break;
        }

        if component == b"." {
            if is_final {
                want_dir = true;
            }
            continue;
        }

        if component == b".." {
            pop_component(result);
            if is_final {
                want_dir = true;
            }
            continue;
        }

        // "/proc/self" names the tracee itself, not the tracer.
        let self_pid = if component == b"self"
            && compare_paths(result, b"/proc") == Comparison::Equal
        {
            tracee.pid().map(|pid| pid.as_raw().to_string().into_bytes())
        } else {
            None
        };
        let component: &[u8] = self_pid.as_deref().unwrap_or(component);

        // Materialize the host view of the next step to know what kind of
        // entry the guest would reach.
        let mut next = Vec::with_capacity(result.len() + component.len() + 1);
        join_paths(&mut next, &[result.as_slice(), component])?;
        let mut host_path = next.clone();
        tracee.bindings().substitute(Side::Guest, &mut host_path)?;

        let metadata = fs::symlink_metadata(as_host_path(&host_path));
        let is_link = metadata
            .as_ref()
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);

        if !is_link || (finality == Finality::FinalNormal && !deref_final) {
            match &metadata {
                Err(_) if !is_final => return Err(VrootError::NoEntry),
                Ok(meta) if !is_final && !meta.is_dir() => {
                    return Err(VrootError::NotADirectory)
                }
                _ => {}
            }
            *result = next;
            continue;
        }

        // A symlink: dereference it and canonicalize the target so the
        // traversal cannot escape the guest root.
        let target = fs::read_link(as_host_path(&host_path))
            .map_err(|err| VrootError::from_io(&err))?;
        let mut target = target.into_os_string().into_vec();
        if target.len() >= PATH_MAX {
            return Err(VrootError::NameTooLong);
        }

        // Strip the host-side view from targets the kernel produced, as
        // with "/proc/self/cwd".
        detranslate_path(tracee, &mut target, Some(host_path.as_slice()))?;

        // An absolute target restarts from "/"; a relative one resolves
        // against the accumulator, which still ends at the symlink's
        // parent directory.
        canonicalize(tracee, &target, true, result, depth + 1)?;
    }

    // A trailing separator, or a final "." or "..", promises a directory.
    if want_dir {
        let mut host_path = result.clone();
        tracee.bindings().substitute(Side::Guest, &mut host_path)?;
        if let Ok(meta) = fs::metadata(as_host_path(&host_path)) {
            if !meta.is_dir() {
                return Err(VrootError::NotADirectory);
            }
        }
    }

    Ok(())
}
