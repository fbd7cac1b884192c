//! # vroot-core
//!
//! Path translation engine for the vroot user-space virtual rootfs.
//!
//! A traced process (the "tracee") sees a synthetic root directory composed
//! of a real host directory plus a set of overlay bindings. This crate
//! provides the two directions of that illusion:
//!
//! - [`translate_path`] converts a path as the tracee expressed it (the
//!   "guest path") into the path the host kernel must be asked about;
//! - [`detranslate_path`] rewrites host paths the kernel hands back, most
//!   notably symlink targets, into guest form before the tracee observes
//!   them.
//!
//! The supervisor that drives tracees with ptrace/seccomp is a separate
//! concern; it calls into this crate on every path-carrying syscall.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod extension;
pub mod path;
pub mod tracee;

pub use extension::{Extension, ExtensionSet, HookAction};
pub use path::binding::{Binding, BindingTable, Substitution};
pub use path::canon::canonicalize;
pub use path::fd::{foreach_fd, list_open_fd};
pub use path::translate::{belongs_to_guestfs, detranslate_path, translate_path, DirFd};
pub use path::{compare_paths, join_paths, next_component, pop_component};
pub use tracee::Tracee;
