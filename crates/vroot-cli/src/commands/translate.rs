//! `vroot translate`: resolve a guest path to its host form.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use clap::Args;
use vroot_core::{translate_path, DirFd};

/// Arguments for the `translate` command.
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Profile selection.
    #[command(flatten)]
    pub profile: super::ProfileArgs,

    /// Do not dereference a final symlink component (`lstat` semantics).
    #[arg(long)]
    pub no_deref: bool,

    /// Guest path to translate; relative paths resolve against the
    /// current working directory.
    pub path: OsString,
}

/// Executes the `translate` command.
///
/// # Errors
///
/// Returns an error if the profile is invalid or translation fails.
pub fn execute(args: TranslateArgs) -> anyhow::Result<()> {
    let tracee = args.profile.build_tracee()?;

    let host = translate_path(&tracee, DirFd::Cwd, args.path.as_bytes(), !args.no_deref)
        .map_err(|err| {
            anyhow::anyhow!(
                "cannot translate {}: {err} (errno {})",
                args.path.to_string_lossy(),
                err.errno()
            )
        })?;

    println!("{}", String::from_utf8_lossy(&host));
    Ok(())
}
