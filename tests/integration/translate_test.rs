//! Integration tests for the path translation engine.
//!
//! These tests are implemented in:
//! `crates/vroot-core/tests/translate_test.rs`
//!
//! Covered scenarios:
//! - `absolute_path_lands_under_the_rootfs`: Guest paths resolve under the rootfs
//! - `binding_redirects_a_guest_prefix`: Guest prefixes map through bindings
//! - `dot_dot_cannot_escape_the_rootfs`: Parent traversal is contained
//! - `absolute_symlink_resolves_inside_the_guest`: Symlink targets stay in the guest namespace
//! - `symlink_target_within_a_binding_stays_in_the_binding`: Detranslation follows shared bindings
//! - `proc_cwd_referrer_strips_the_rootfs`: Dynamic /proc links are emulated
//! - `extension_hook_short_circuits_translation`: Hooks can take over a translation
