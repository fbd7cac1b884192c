//! Per-tracee translation context.

use std::sync::Arc;

use nix::unistd::{getpid, Pid};

use crate::extension::ExtensionSet;
use crate::path::binding::BindingTable;

/// Translation context for one traced process.
///
/// The binding table and the extension set are shared, read-only
/// collaborators; everything mutable is per-call, so one context is only
/// ever driven from a single thread at a time.
#[derive(Debug, Clone)]
pub struct Tracee {
    pid: Option<Pid>,
    bindings: Arc<BindingTable>,
    extensions: Arc<ExtensionSet>,
}

impl Tracee {
    /// Creates a context that is not yet attached to a live process.
    #[must_use]
    pub fn new(bindings: Arc<BindingTable>, extensions: Arc<ExtensionSet>) -> Self {
        Self {
            pid: None,
            bindings,
            extensions,
        }
    }

    /// Attaches the context to a live host pid.
    #[must_use]
    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches the context to a live host pid in place.
    pub fn set_pid(&mut self, pid: Pid) {
        self.pid = Some(pid);
    }

    /// Pid of the traced process, if it has started.
    #[must_use]
    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    /// Pid whose `/proc` entries anchor relative paths: the tracee once it
    /// runs, the tracer itself beforehand.
    #[must_use]
    pub fn effective_pid(&self) -> Pid {
        self.pid.unwrap_or_else(getpid)
    }

    /// Host directory presented to the tracee as `/`.
    #[must_use]
    pub fn root(&self) -> &[u8] {
        self.bindings.root()
    }

    /// Shared binding table.
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Shared extension hooks.
    #[must_use]
    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracee() -> Tracee {
        let table = BindingTable::new(b"/jail").expect("table");
        Tracee::new(Arc::new(table), Arc::new(ExtensionSet::new()))
    }

    #[test]
    fn unattached_context_falls_back_to_the_tracer_pid() {
        let tracee = tracee();
        assert_eq!(tracee.pid(), None);
        assert_eq!(tracee.effective_pid(), getpid());
    }

    #[test]
    fn attached_context_uses_the_tracee_pid() {
        let tracee = tracee().with_pid(Pid::from_raw(123));
        assert_eq!(tracee.effective_pid(), Pid::from_raw(123));
    }

    #[test]
    fn root_comes_from_the_binding_table() {
        assert_eq!(tracee().root(), b"/jail");
    }
}
