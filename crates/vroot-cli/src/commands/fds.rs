//! `vroot fds`: list the open file descriptors of a process.

use clap::Args;
use nix::unistd::Pid;
use vroot_core::foreach_fd;

/// Arguments for the `fds` command.
#[derive(Args, Debug)]
pub struct FdsArgs {
    /// Process to inspect.
    pub pid: i32,
}

/// Executes the `fds` command.
///
/// Descriptors that do not refer to a path (sockets, pipes) are omitted,
/// matching what the translation engine would skip.
///
/// # Errors
///
/// Returns an error if the walk is interrupted; an unreadable process is
/// reported as an empty listing.
pub fn execute(args: FdsArgs) -> anyhow::Result<()> {
    foreach_fd(Pid::from_raw(args.pid), |_, fd, path| {
        println!("{fd}\t{}", String::from_utf8_lossy(path));
        Ok(())
    })?;
    Ok(())
}
