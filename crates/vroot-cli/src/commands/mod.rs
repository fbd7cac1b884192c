//! CLI command definitions and dispatch.

pub mod bindings;
pub mod detranslate;
pub mod fds;
pub mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::os::unix::ffi::OsStrExt;

use vroot_common::config::{load_profile, BindingSpec, ProfileConfig};
use vroot_core::{BindingTable, ExtensionSet, Tracee};

/// User-space virtual rootfs path translation.
#[derive(Parser, Debug)]
#[command(name = "vroot", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a guest path into the host path the kernel would see.
    Translate(translate::TranslateArgs),
    /// Rewrite a host path back into guest form.
    Detranslate(detranslate::DetranslateArgs),
    /// Print the resolved binding table of a profile.
    Bindings(bindings::BindingsArgs),
    /// List the open file descriptors of a process.
    Fds(fds::FdsArgs),
}

/// Profile selection shared by the path commands.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Host directory presented as the guest `/`.
    #[arg(short, long, default_value = vroot_common::constants::DEFAULT_ROOTFS)]
    pub rootfs: PathBuf,

    /// Add a binding, host side first. Repeatable.
    #[arg(short, long = "bind", value_name = "HOST[:GUEST]")]
    pub bind: Vec<String>,

    /// Load rootfs and bindings from a JSON profile instead.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ProfileArgs {
    /// Builds the tracee context described by these flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be loaded, the rootfs does
    /// not resolve, or a binding spec is malformed.
    pub fn build_tracee(&self) -> anyhow::Result<Tracee> {
        let profile = match &self.config {
            Some(path) => load_profile(path)
                .with_context(|| format!("cannot load profile {}", path.display()))?,
            None => {
                let mut profile = ProfileConfig {
                    rootfs: self.rootfs.clone(),
                    bindings: Vec::new(),
                };
                for spec in &self.bind {
                    profile.bindings.push(BindingSpec::parse(spec)?);
                }
                profile
            }
        };

        let rootfs = std::fs::canonicalize(&profile.rootfs)
            .with_context(|| format!("cannot resolve rootfs {}", profile.rootfs.display()))?;

        let mut table = BindingTable::new(rootfs.as_os_str().as_bytes())?;
        for binding in &profile.bindings {
            table.bind(
                binding.host.as_os_str().as_bytes(),
                binding.guest.as_os_str().as_bytes(),
            )
            .with_context(|| format!("cannot register binding {binding}"))?;
        }

        Ok(Tracee::new(Arc::new(table), Arc::new(ExtensionSet::new())))
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Translate(args) => translate::execute(args),
        Command::Detranslate(args) => detranslate::execute(args),
        Command::Bindings(args) => bindings::execute(args),
        Command::Fds(args) => fds::execute(args),
    }
}
