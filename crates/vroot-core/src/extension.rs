//! Extension hook point used during translation.
//!
//! A single interception point exists today: right before
//! canonicalization, hooks see the anchored result buffer and the raw
//! guest path. A hook may rewrite the buffer wholesale and declare the
//! translation handled, in which case canonicalization and binding
//! substitution are skipped.

use std::fmt;

use vroot_common::error::Result;

/// Verdict returned by a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Translation proceeds normally.
    Continue,
    /// The hook wrote a final host path into the result buffer.
    Handled,
}

/// A path-translation extension.
///
/// Hooks are shared between tracees and may run concurrently for
/// different tracees, so implementations carrying mutable state must
/// synchronize it themselves.
pub trait Extension: Send + Sync {
    /// Called with the anchored result buffer and the tracee-supplied
    /// path.
    ///
    /// # Errors
    ///
    /// An error aborts the translation and reaches the tracee as-is.
    fn on_guest_path(&self, result: &mut Vec<u8>, fake_path: &[u8]) -> Result<HookAction>;
}

/// Ordered set of registered extensions.
#[derive(Default)]
pub struct ExtensionSet {
    hooks: Vec<Box<dyn Extension>>,
}

impl ExtensionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook at the end of the notification order.
    pub fn register(&mut self, hook: Box<dyn Extension>) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Notifies hooks in registration order; the first [`HookAction::Handled`]
    /// verdict wins.
    ///
    /// # Errors
    ///
    /// The first hook error aborts the notification and is propagated.
    pub fn notify_guest_path(&self, result: &mut Vec<u8>, fake_path: &[u8]) -> Result<HookAction> {
        for hook in &self.hooks {
            if hook.on_guest_path(result, fake_path)? == HookAction::Handled {
                return Ok(HookAction::Handled);
            }
        }
        Ok(HookAction::Continue)
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionSet")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
