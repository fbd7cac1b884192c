//! # vroot, the virtual rootfs path translation toolkit
//!
//! Diagnostic front-end for the vroot translation engine: resolve guest
//! paths against a rootfs profile exactly the way a traced process would
//! see them, without tracing anything.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
