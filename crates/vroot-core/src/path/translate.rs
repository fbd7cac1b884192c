//! Guest-to-host translation and host-to-guest detranslation entry points.
//!
//! The supervisor calls [`translate_path`] with the raw path argument of a
//! syscall and hands the kernel the result; it calls [`detranslate_path`]
//! on host paths flowing the other way, the target just read by
//! `readlink(2)` being the prime example.

use std::fs;
use std::os::unix::ffi::OsStringExt;

use vroot_common::constants::{PATH_MAX, PROC_ROOT};
use vroot_common::error::{Result, VrootError};
use vroot_common::types::{Comparison, Side};

use crate::extension::HookAction;
use crate::path::binding::Substitution;
use crate::path::canon::{as_host_path, canonicalize};
use crate::path::compare_paths;
use crate::path::proc::readlink_proc;
use crate::tracee::Tracee;

/// Directory anchor for a relative guest path, mirroring the `openat(2)`
/// family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirFd {
    /// Anchor at the tracee's current working directory (`AT_FDCWD`).
    Cwd,
    /// Anchor at the directory open at this descriptor.
    Fd(i32),
}

/// Translates `fake_path`, as the tracee expressed it, into the canonical
/// host path the kernel must be asked about.
///
/// A relative `fake_path` is anchored at `dir_fd`, resolved through the
/// tracee's `/proc` entries. `deref_final` states whether a final symlink
/// component is itself followed, as `stat(2)` does and `lstat(2)` does
/// not.
///
/// # Errors
///
/// - [`VrootError::OperationFailed`] when the anchor's `/proc` link cannot
///   be read;
/// - [`VrootError::NotADirectory`] when `dir_fd` does not refer to a
///   directory;
/// - any canonicalization or detranslation failure, unchanged.
pub fn translate_path(
    tracee: &Tracee,
    dir_fd: DirFd,
    fake_path: &[u8],
    deref_final: bool,
) -> Result<Vec<u8>> {
    let pid = tracee.effective_pid();
    let mut result: Vec<u8>;

    if fake_path.first() == Some(&b'/') {
        // Absolute fake paths are anchored at the guest root.
        result = b"/".to_vec();
    } else {
        // Relative to the working directory or to a directory referred
        // to by a descriptor; read the corresponding "virtual" link.
        let link = match dir_fd {
            DirFd::Cwd => format!("/proc/{pid}/cwd"),
            DirFd::Fd(fd) => format!("/proc/{pid}/fd/{fd}"),
        };
        let anchor = fs::read_link(&link).map_err(|_| VrootError::OperationFailed)?;
        result = anchor.into_os_string().into_vec();
        if result.len() >= PATH_MAX {
            return Err(VrootError::NameTooLong);
        }

        if let DirFd::Fd(_) = dir_fd {
            // The anchor must be a directory; a failed stat counts as
            // not being one.
            match fs::metadata(as_host_path(&result)) {
                Ok(meta) if meta.is_dir() => {}
                _ => return Err(VrootError::NotADirectory),
            }
        }

        // The link value is a host path; bring it back into guest form.
        detranslate_path(tracee, &mut result, None)?;
    }

    tracing::trace!(
        pid = pid.as_raw(),
        base = %String::from_utf8_lossy(&result),
        path = %String::from_utf8_lossy(fake_path),
        "translate"
    );

    if tracee.extensions().notify_guest_path(&mut result, fake_path)? == HookAction::Continue {
        // Canonicalize regarding the guest root, then substitute bindings
        // to land in the host namespace.
        canonicalize(tracee, fake_path, deref_final, &mut result, 0)?;
        tracee.bindings().substitute(Side::Guest, &mut result)?;
    }

    tracing::trace!(
        pid = pid.as_raw(),
        host = %String::from_utf8_lossy(&result),
        "translated"
    );
    Ok(result)
}

/// Rewrites the host path `path` into guest form, in place.
///
/// `referrer` is the host path of the symlink whose target is being
/// rewritten, when there is one. Top-level calls pass `None` and are
/// sanity-checked: a host path outside the guest namespace is an error
/// rather than a leak.
///
/// Returns `Ok(None)` when the path needs no rewrite, and `Ok(Some(len))`
/// with the new byte length otherwise.
///
/// # Errors
///
/// [`VrootError::PermissionDenied`] when a sanity-checked path falls
/// outside the guest rootfs and its bindings.
pub fn detranslate_path(
    tracee: &Tracee,
    path: &mut Vec<u8>,
    referrer: Option<&[u8]>,
) -> Result<Option<usize>> {
    // Relative symlink targets are presented untouched.
    if path.first() != Some(&b'/') {
        return Ok(None);
    }

    let mut sanity_check = true;
    let mut follow_binding = true;

    if let Some(referrer) = referrer {
        sanity_check = false;
        follow_binding = false;

        if compare_paths(PROC_ROOT, referrer) == Comparison::Path1IsPrefix {
            // Some links under "/proc" are generated dynamically by the
            // kernel and have to be emulated.
            if let Some(new_length) = readlink_proc(tracee, path, referrer)? {
                return Ok(Some(new_length));
            }

            // Always resolve bindings for symlinks under "/proc": they
            // point into the emulated filesystem namespace.
            follow_binding = true;
        } else if !belongs_to_guestfs(tracee, referrer) {
            let binding_referee = tracee.bindings().get(Side::Host, path);
            let binding_referrer = tracee.bindings().get(Side::Host, referrer);

            // Resolve bindings for a symlink that belongs to a binding
            // and points into that same binding: with "-b /lib:/foo", the
            // host symlink "/lib/a -> /lib/b" has to appear as
            // "/foo/a -> /foo/b" in the guest namespace.
            if let (Some(referee), Some(referrer_binding)) = (binding_referee, binding_referrer)
            {
                follow_binding = std::ptr::eq(referee, referrer_binding);
            }
        }
    }

    if follow_binding {
        match tracee.bindings().substitute(Side::Host, path)? {
            Substitution::Unchanged => return Ok(None),
            Substitution::Substituted => return Ok(Some(path.len())),
            Substitution::NoMatch => {}
        }
    }

    match compare_paths(tracee.root(), path) {
        Comparison::Path1IsPrefix => {
            // Remove the leading rootfs part.
            path.drain(..tracee.root().len());
            Ok(Some(path.len()))
        }
        Comparison::Equal => {
            path.clear();
            path.push(b'/');
            Ok(Some(1))
        }
        // A single-byte rootfs: host and guest namespaces coincide.
        _ if tracee.root() == b"/" => Ok(None),
        _ if sanity_check => Err(VrootError::PermissionDenied),
        _ => Ok(None),
    }
}

/// Whether `host_path` lies under the guest rootfs proper, as opposed to
/// being reachable only through a binding.
#[must_use]
pub fn belongs_to_guestfs(tracee: &Tracee, host_path: &[u8]) -> bool {
    if tracee.root() == b"/" {
        return host_path.first() == Some(&b'/');
    }
    matches!(
        compare_paths(tracee.root(), host_path),
        Comparison::Equal | Comparison::Path1IsPrefix
    )
}
