//! `vroot detranslate`: rewrite a host path back into guest form.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use clap::Args;
use vroot_core::detranslate_path;

/// Arguments for the `detranslate` command.
#[derive(Args, Debug)]
pub struct DetranslateArgs {
    /// Profile selection.
    #[command(flatten)]
    pub profile: super::ProfileArgs,

    /// Host path of the symlink whose target is being rewritten, if any.
    #[arg(long, value_name = "PATH")]
    pub referrer: Option<OsString>,

    /// Host path to rewrite.
    pub path: OsString,
}

/// Executes the `detranslate` command.
///
/// # Errors
///
/// Returns an error if the profile is invalid or the path falls outside
/// the guest namespace.
pub fn execute(args: DetranslateArgs) -> anyhow::Result<()> {
    let tracee = args.profile.build_tracee()?;

    let mut path = args.path.as_bytes().to_vec();
    let referrer = args.referrer.as_ref().map(|r| r.as_bytes().to_vec());
    detranslate_path(&tracee, &mut path, referrer.as_deref()).map_err(|err| {
        anyhow::anyhow!(
            "cannot detranslate {}: {err} (errno {})",
            args.path.to_string_lossy(),
            err.errno()
        )
    })?;

    println!("{}", String::from_utf8_lossy(&path));
    Ok(())
}
