//! Ordered guest/host prefix bindings.
//!
//! A binding overlays a host-side directory onto a guest-side prefix. The
//! guest rootfs itself is the table's first entry, `/` mapped onto the
//! rootfs host directory, so a guest-to-host substitution always has
//! something to apply: that substitution is the sole mechanism that turns
//! a canonical guest path into a host path.

use vroot_common::constants::PATH_MAX;
use vroot_common::error::{Result, VrootError};
use vroot_common::types::{Comparison, Side};

use crate::path::{compare_paths, join_paths, trimmed_length};

/// One overlay mapping between a guest-side and a host-side prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    guest: Vec<u8>,
    host: Vec<u8>,
}

impl Binding {
    fn new(host: &[u8], guest: &[u8]) -> Result<Self> {
        Ok(Self {
            guest: normalize_prefix(guest)?,
            host: normalize_prefix(host)?,
        })
    }

    /// Prefix on the given side.
    #[must_use]
    pub fn side(&self, side: Side) -> &[u8] {
        match side {
            Side::Guest => &self.guest,
            Side::Host => &self.host,
        }
    }

    /// Guest-side prefix.
    #[must_use]
    pub fn guest(&self) -> &[u8] {
        &self.guest
    }

    /// Host-side prefix.
    #[must_use]
    pub fn host(&self) -> &[u8] {
        &self.host
    }

    /// Whether both sides are byte-identical, making substitution a no-op.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.guest == self.host
    }

    /// Whether this binding's `side` prefix covers `path`.
    fn matches(&self, side: Side, path: &[u8]) -> bool {
        let prefix = self.side(side);
        if prefix == b"/" {
            // The universal prefix; the comparator keeps the sole
            // separator significant, so handle it here.
            return path.first() == Some(&b'/');
        }
        matches!(
            compare_paths(prefix, path),
            Comparison::Equal | Comparison::Path1IsPrefix
        )
    }
}

/// Validates an absolute prefix and trims its trailing separator.
fn normalize_prefix(path: &[u8]) -> Result<Vec<u8>> {
    if path.first() != Some(&b'/') {
        return Err(VrootError::InvalidPath);
    }
    if path.len() >= PATH_MAX {
        return Err(VrootError::NameTooLong);
    }
    let length = if path.len() > 1 && path.last() == Some(&b'/') {
        path.len() - 1
    } else {
        path.len()
    };
    Ok(path[..length].to_vec())
}

/// Outcome of a binding substitution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// No binding covers the path.
    NoMatch,
    /// A symmetric binding covers the path; nothing to rewrite.
    Unchanged,
    /// The matched prefix was replaced with the binding's other side.
    Substituted,
}

/// Ordered set of bindings with longest-prefix lookup on either side.
///
/// Built once at supervisor start-up and read-only afterwards; tracees
/// share one table behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BindingTable {
    root: Vec<u8>,
    entries: Vec<Binding>,
}

impl BindingTable {
    /// Creates a table for the given guest rootfs host directory,
    /// pre-seeded with the rootfs binding `/` -> `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an absolute path of a sane
    /// length.
    pub fn new(root: &[u8]) -> Result<Self> {
        let root = normalize_prefix(root)?;
        let entries = vec![Binding {
            guest: b"/".to_vec(),
            host: root.clone(),
        }];
        Ok(Self { root, entries })
    }

    /// Host directory that backs the guest `/`.
    #[must_use]
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// Registers a binding, host side first (the `-b HOST:GUEST` syntax).
    ///
    /// A duplicate guest prefix replaces the earlier entry and takes its
    /// place at the end of the evaluation order, so it also wins
    /// insertion-order ties.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is not absolute or is too long.
    pub fn bind(&mut self, host: &[u8], guest: &[u8]) -> Result<()> {
        let binding = Binding::new(host, guest)?;
        self.entries.retain(|entry| entry.guest != binding.guest);
        tracing::debug!(
            host = %String::from_utf8_lossy(binding.host()),
            guest = %String::from_utf8_lossy(binding.guest()),
            "binding registered"
        );
        self.entries.push(binding);
        Ok(())
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    /// Longest-prefix binding covering `path`, keyed on `side`.
    ///
    /// When two prefixes tie in length the later-inserted entry wins.
    #[must_use]
    pub fn get(&self, side: Side, path: &[u8]) -> Option<&Binding> {
        let mut best: Option<&Binding> = None;
        for binding in &self.entries {
            if !binding.matches(side, path) {
                continue;
            }
            match best {
                Some(found) if found.side(side).len() > binding.side(side).len() => {}
                _ => best = Some(binding),
            }
        }
        best
    }

    /// Rewrites `path` in place, swapping the matched `side` prefix for
    /// the binding's other side.
    ///
    /// # Errors
    ///
    /// Returns [`VrootError::NameTooLong`] if the rewritten path would
    /// reach `PATH_MAX` bytes.
    pub fn substitute(&self, side: Side, path: &mut Vec<u8>) -> Result<Substitution> {
        let Some(binding) = self.get(side, path) else {
            return Ok(Substitution::NoMatch);
        };
        if binding.is_symmetric() {
            return Ok(Substitution::Unchanged);
        }

        let prefix = binding.side(side);
        let replacement = binding.side(side.other());
        // Slice up to the comparator's trimmed length, so the one trailing
        // separator it tolerates cannot survive into the rewritten path.
        let suffix = path[prefix.len()..trimmed_length(path)].to_vec();

        let mut rewritten = Vec::with_capacity(replacement.len() + suffix.len() + 1);
        join_paths(&mut rewritten, &[replacement, &suffix])?;
        *path = rewritten;
        Ok(Substitution::Substituted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BindingTable {
        BindingTable::new(b"/jail").expect("table")
    }

    #[test]
    fn new_table_carries_the_rootfs_binding() {
        let table = table();
        assert_eq!(table.root(), b"/jail");

        let binding = table.get(Side::Guest, b"/usr/bin").expect("rootfs binding");
        assert_eq!(binding.guest(), b"/");
        assert_eq!(binding.host(), b"/jail");
    }

    #[test]
    fn guest_substitution_prefixes_the_rootfs() {
        let table = table();
        let mut path = b"/usr/bin/ls".to_vec();
        let outcome = table.substitute(Side::Guest, &mut path).expect("substitute");
        assert_eq!(outcome, Substitution::Substituted);
        assert_eq!(path, b"/jail/usr/bin/ls");
    }

    #[test]
    fn guest_root_maps_onto_the_rootfs_itself() {
        let table = table();
        let mut path = b"/".to_vec();
        table.substitute(Side::Guest, &mut path).expect("substitute");
        assert_eq!(path, b"/jail");
    }

    #[test]
    fn explicit_binding_shadows_the_rootfs() {
        let mut table = table();
        table.bind(b"/etc", b"/cfg").expect("bind");

        let mut path = b"/cfg/hosts".to_vec();
        table.substitute(Side::Guest, &mut path).expect("substitute");
        assert_eq!(path, b"/etc/hosts");
    }

    #[test]
    fn longest_guest_prefix_wins() {
        let mut table = table();
        table.bind(b"/one", b"/a").expect("bind");
        table.bind(b"/two", b"/a/b").expect("bind");

        let binding = table.get(Side::Guest, b"/a/b/c").expect("binding");
        assert_eq!(binding.host(), b"/two");

        let binding = table.get(Side::Guest, b"/a/c").expect("binding");
        assert_eq!(binding.host(), b"/one");
    }

    #[test]
    fn later_entry_wins_a_host_side_tie() {
        let mut table = table();
        table.bind(b"/lib", b"/first").expect("bind");
        table.bind(b"/lib", b"/second").expect("bind");

        let binding = table.get(Side::Host, b"/lib/a").expect("binding");
        assert_eq!(binding.guest(), b"/second");
    }

    #[test]
    fn duplicate_guest_prefix_replaces_the_earlier_entry() {
        let mut table = table();
        table.bind(b"/old", b"/cfg").expect("bind");
        table.bind(b"/new", b"/cfg").expect("bind");

        let matching: Vec<_> = table.iter().filter(|b| b.guest() == b"/cfg").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].host(), b"/new");
    }

    #[test]
    fn symmetric_binding_reports_unchanged() {
        let mut table = table();
        table.bind(b"/lib", b"/lib").expect("bind");

        let mut path = b"/lib/a".to_vec();
        let outcome = table.substitute(Side::Host, &mut path).expect("substitute");
        assert_eq!(outcome, Substitution::Unchanged);
        assert_eq!(path, b"/lib/a");
    }

    #[test]
    fn host_substitution_strips_the_rootfs() {
        let table = table();
        let mut path = b"/jail/home/user".to_vec();
        let outcome = table.substitute(Side::Host, &mut path).expect("substitute");
        assert_eq!(outcome, Substitution::Substituted);
        assert_eq!(path, b"/home/user");
    }

    #[test]
    fn unrelated_host_path_has_no_match() {
        let table = table();
        let mut path = b"/opt/tool".to_vec();
        let outcome = table.substitute(Side::Host, &mut path).expect("substitute");
        assert_eq!(outcome, Substitution::NoMatch);
        assert_eq!(path, b"/opt/tool");
    }

    #[test]
    fn partial_component_does_not_match() {
        let mut table = table();
        table.bind(b"/etc", b"/cfg").expect("bind");
        assert!(table.get(Side::Guest, b"/cfgfile").is_none());
    }

    #[test]
    fn trailing_separator_is_trimmed_on_registration() {
        let mut table = table();
        table.bind(b"/etc/", b"/cfg/").expect("bind");
        let binding = table.get(Side::Guest, b"/cfg").expect("binding");
        assert_eq!(binding.host(), b"/etc");
        assert_eq!(binding.guest(), b"/cfg");
    }

    #[test]
    fn trailing_separator_does_not_survive_substitution() {
        let mut table = table();
        table.bind(b"/etc", b"/cfg").expect("bind");

        let mut path = b"/cfg/".to_vec();
        let outcome = table.substitute(Side::Guest, &mut path).expect("substitute");
        assert_eq!(outcome, Substitution::Substituted);
        assert_eq!(path, b"/etc");

        let mut path = b"/cfg/ssl/".to_vec();
        table.substitute(Side::Guest, &mut path).expect("substitute");
        assert_eq!(path, b"/etc/ssl");
    }

    #[test]
    fn relative_prefixes_are_rejected() {
        let mut table = table();
        assert!(table.bind(b"etc", b"/cfg").is_err());
        assert!(table.bind(b"/etc", b"cfg").is_err());
        assert!(BindingTable::new(b"jail").is_err());
    }
}
