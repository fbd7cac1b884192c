//! `vroot bindings`: print the resolved binding table of a profile.

use clap::Args;
use vroot_common::types::Side;

/// Arguments for the `bindings` command.
#[derive(Args, Debug)]
pub struct BindingsArgs {
    /// Profile selection.
    #[command(flatten)]
    pub profile: super::ProfileArgs,

    /// Print host-side prefixes first instead of guest-side ones.
    #[arg(long)]
    pub by_host: bool,
}

/// Executes the `bindings` command.
///
/// # Errors
///
/// Returns an error if the profile is invalid.
pub fn execute(args: BindingsArgs) -> anyhow::Result<()> {
    let tracee = args.profile.build_tracee()?;

    let (key, value) = if args.by_host {
        (Side::Host, Side::Guest)
    } else {
        (Side::Guest, Side::Host)
    };

    for binding in tracee.bindings().iter() {
        println!(
            "{} -> {}",
            String::from_utf8_lossy(binding.side(key)),
            String::from_utf8_lossy(binding.side(value)),
        );
    }
    Ok(())
}
