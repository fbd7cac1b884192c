//! Enumeration of a process's open file descriptors through `/proc`.

use std::fs;
use std::os::unix::ffi::OsStringExt;

use nix::unistd::Pid;
use vroot_common::constants::PATH_MAX;
use vroot_common::error::Result;

/// Calls `callback` for each open descriptor of `pid` that refers to an
/// absolute path.
///
/// Unreadable entries and descriptors that do not point at a path
/// (sockets, pipes, anonymous inodes) are skipped. The first callback
/// error stops the walk and is returned; an unreadable fd directory is
/// not an error.
///
/// # Errors
///
/// Only errors returned by `callback` itself.
pub fn foreach_fd<F>(pid: Pid, mut callback: F) -> Result<()>
where
    F: FnMut(Pid, i32, &[u8]) -> Result<()>,
{
    let proc_fd = format!("/proc/{pid}/fd");
    let Ok(entries) = fs::read_dir(&proc_fd) else {
        return Ok(());
    };

    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let Some(fd) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i32>().ok())
        else {
            continue;
        };
        let Ok(target) = fs::read_link(entry.path()) else {
            continue;
        };
        let target = target.into_os_string().into_vec();
        if target.len() >= PATH_MAX || target.first() != Some(&b'/') {
            continue;
        }
        callback(pid, fd, &target)?;
    }

    Ok(())
}

/// Logs an advisory notice for every descriptor already open in `pid`.
///
/// Useful right after attaching to a running process: paths reached
/// through those descriptors were resolved before translation began.
///
/// # Errors
///
/// None in practice; the signature matches [`foreach_fd`].
pub fn list_open_fd(pid: Pid) -> Result<()> {
    foreach_fd(pid, |pid, fd, path| {
        tracing::info!(
            pid = pid.as_raw(),
            fd,
            path = %String::from_utf8_lossy(path),
            "access through an already-open descriptor won't be translated until closed"
        );
        Ok(())
    })
}
