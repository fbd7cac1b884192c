//! Emulation of dynamic `/proc` symlinks.
//!
//! The kernel generates the targets of `/proc/<pid>/{cwd,root,exe}` and
//! `/proc/<pid>/fd/<n>` on the fly, and those targets are host paths. A
//! tracee reading them must see guest paths instead, so the detranslator
//! routes referrers under `/proc` through here first.

use vroot_common::error::Result;
use vroot_common::types::{Comparison, Side};

use crate::path::binding::Substitution;
use crate::path::compare_paths;
use crate::tracee::Tracee;

/// Dynamic `/proc/<pid>` entries the emulator recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcEntry {
    Cwd,
    Root,
    Exe,
    Fd,
}

/// Rewrites the kernel-produced target of a dynamic `/proc/<pid>` link
/// into guest form.
///
/// Only entries of the context's own pid are emulated. Returns the
/// rewritten length, or `None` when the referrer is not an emulated entry
/// and the caller should fall back to generic detranslation.
pub(crate) fn readlink_proc(
    tracee: &Tracee,
    path: &mut Vec<u8>,
    referrer: &[u8],
) -> Result<Option<usize>> {
    let Some(entry) = parse_entry(tracee, referrer) else {
        return Ok(None);
    };

    match entry {
        ProcEntry::Root => {
            // The tracee believes it owns the real root.
            path.clear();
            path.push(b'/');
            Ok(Some(1))
        }
        ProcEntry::Cwd | ProcEntry::Exe | ProcEntry::Fd => detranslate_guestward(tracee, path),
    }
}

/// Parses `/proc/<pid>/<entry>` referrers naming the context's pid.
fn parse_entry(tracee: &Tracee, referrer: &[u8]) -> Option<ProcEntry> {
    let rest = referrer.strip_prefix(b"/proc/")?;
    let separator = rest.iter().position(|&byte| byte == b'/')?;
    let (pid, entry) = rest.split_at(separator);
    let entry = &entry[1..];

    let pid: i32 = std::str::from_utf8(pid).ok()?.parse().ok()?;
    if pid != tracee.effective_pid().as_raw() {
        return None;
    }

    match entry {
        b"cwd" => Some(ProcEntry::Cwd),
        b"root" => Some(ProcEntry::Root),
        b"exe" => Some(ProcEntry::Exe),
        _ => {
            let fd = entry.strip_prefix(b"fd/")?;
            (!fd.is_empty() && fd.iter().all(u8::is_ascii_digit)).then_some(ProcEntry::Fd)
        }
    }
}

/// Binding-aware rootfs strip shared by the emulated entries.
///
/// Never recurses back into detranslation, which keeps the anchor
/// recursion of the translator finite.
fn detranslate_guestward(tracee: &Tracee, path: &mut Vec<u8>) -> Result<Option<usize>> {
    match tracee.bindings().substitute(Side::Host, path)? {
        Substitution::Substituted | Substitution::Unchanged => return Ok(Some(path.len())),
        Substitution::NoMatch => {}
    }

    match compare_paths(tracee.root(), path) {
        Comparison::Path1IsPrefix => {
            path.drain(..tracee.root().len());
            Ok(Some(path.len()))
        }
        Comparison::Equal => {
            path.clear();
            path.push(b'/');
            Ok(Some(1))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nix::unistd::Pid;

    use super::*;
    use crate::extension::ExtensionSet;
    use crate::path::binding::BindingTable;

    fn tracee(root: &[u8], pid: i32) -> Tracee {
        let table = BindingTable::new(root).expect("table");
        Tracee::new(Arc::new(table), Arc::new(ExtensionSet::new())).with_pid(Pid::from_raw(pid))
    }

    #[test]
    fn cwd_value_is_detranslated() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/jail/home/user".to_vec();
        let status = readlink_proc(&tracee, &mut path, b"/proc/123/cwd").expect("ok");
        assert_eq!(status, Some(b"/home/user".len()));
        assert_eq!(path, b"/home/user");
    }

    #[test]
    fn root_entry_is_the_guest_root() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/".to_vec();
        let status = readlink_proc(&tracee, &mut path, b"/proc/123/root").expect("ok");
        assert_eq!(status, Some(1));
        assert_eq!(path, b"/");
    }

    #[test]
    fn fd_entries_are_detranslated() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/jail/var/log/app.log".to_vec();
        let status = readlink_proc(&tracee, &mut path, b"/proc/123/fd/7").expect("ok");
        assert_eq!(status, Some(b"/var/log/app.log".len()));
        assert_eq!(path, b"/var/log/app.log");
    }

    #[test]
    fn foreign_pid_is_not_emulated() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/jail/home/user".to_vec();
        let status = readlink_proc(&tracee, &mut path, b"/proc/999/cwd").expect("ok");
        assert_eq!(status, None);
        assert_eq!(path, b"/jail/home/user");
    }

    #[test]
    fn static_proc_entries_are_not_emulated() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/jail/x".to_vec();
        for referrer in [&b"/proc/123/maps"[..], b"/proc/cpuinfo", b"/proc/123/fd/x"] {
            let status = readlink_proc(&tracee, &mut path, referrer).expect("ok");
            assert_eq!(status, None, "referrer {:?}", String::from_utf8_lossy(referrer));
        }
    }

    #[test]
    fn exe_outside_the_guest_namespace_falls_through() {
        let tracee = tracee(b"/jail", 123);
        let mut path = b"/opt/interpreter".to_vec();
        let status = readlink_proc(&tracee, &mut path, b"/proc/123/exe").expect("ok");
        assert_eq!(status, None);
        assert_eq!(path, b"/opt/interpreter");
    }
}
