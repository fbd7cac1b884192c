//! Profile configuration: the guest rootfs plus its overlay bindings.
//!
//! A profile is everything the translation engine needs to present a
//! synthetic root to a tracee. Profiles are plain JSON on disk so they can
//! be inspected and edited by hand.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VrootError};

/// A single overlay binding, host side first (the `-b HOST:GUEST` syntax).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Host-side prefix, what the kernel is asked about.
    pub host: PathBuf,
    /// Guest-side prefix, what the tracee sees.
    pub guest: PathBuf,
}

impl BindingSpec {
    /// Parses the `HOST[:GUEST]` colon syntax.
    ///
    /// Without an explicit guest side, the host path is bound onto itself.
    ///
    /// # Errors
    ///
    /// Returns an error if either side of the spec is empty.
    pub fn parse(spec: &str) -> Result<Self> {
        let (host, guest) = match spec.split_once(':') {
            Some(sides) => sides,
            None => (spec, spec),
        };
        if host.is_empty() || guest.is_empty() {
            return Err(VrootError::Profile {
                message: format!("empty side in binding spec: {spec:?}"),
            });
        }
        Ok(Self {
            host: host.into(),
            guest: guest.into(),
        })
    }
}

impl fmt::Display for BindingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host.display(), self.guest.display())
    }
}

/// Root configuration for a vroot session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Host directory presented to the tracee as `/`.
    pub rootfs: PathBuf,
    /// Overlay bindings, in evaluation order.
    #[serde(default)]
    pub bindings: Vec<BindingSpec>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            rootfs: PathBuf::from(crate::constants::DEFAULT_ROOTFS),
            bindings: Vec::new(),
        }
    }
}

/// Loads a profile from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_profile(path: &Path) -> Result<ProfileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VrootError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let profile: ProfileConfig = serde_json::from_str(&content)?;
    Ok(profile)
}

/// Persists a profile as pretty-printed JSON.
///
/// Creates parent directories if they do not exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_profile(path: &Path, profile: &ProfileConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| VrootError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json).map_err(|e| VrootError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_spec_splits_on_colon() {
        let spec = BindingSpec::parse("/etc:/cfg").expect("should parse");
        assert_eq!(spec.host, PathBuf::from("/etc"));
        assert_eq!(spec.guest, PathBuf::from("/cfg"));
    }

    #[test]
    fn parse_bare_spec_binds_onto_itself() {
        let spec = BindingSpec::parse("/lib").expect("should parse");
        assert_eq!(spec.host, spec.guest);
    }

    #[test]
    fn parse_empty_side_is_rejected() {
        assert!(BindingSpec::parse(":/cfg").is_err());
        assert!(BindingSpec::parse("/etc:").is_err());
        assert!(BindingSpec::parse("").is_err());
    }

    #[test]
    fn display_roundtrips_the_colon_syntax() {
        let spec = BindingSpec::parse("/etc:/cfg").expect("should parse");
        assert_eq!(spec.to_string(), "/etc:/cfg");
    }

    #[test]
    fn default_profile_uses_the_real_root() {
        let profile = ProfileConfig::default();
        assert_eq!(profile.rootfs, PathBuf::from("/"));
        assert!(profile.bindings.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("profile.json");

        let profile = ProfileConfig {
            rootfs: PathBuf::from("/srv/jail"),
            bindings: vec![BindingSpec::parse("/etc:/cfg").expect("should parse")],
        };

        save_profile(&path, &profile).expect("save should succeed");
        let loaded = load_profile(&path).expect("load should succeed");

        assert_eq!(loaded.rootfs, PathBuf::from("/srv/jail"));
        assert_eq!(loaded.bindings.len(), 1);
        assert_eq!(loaded.bindings[0].guest, PathBuf::from("/cfg"));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("profile.json");

        save_profile(&path, &ProfileConfig::default()).expect("save should create dirs");
        assert!(path.exists());
    }

    #[test]
    fn bindings_field_is_optional_in_json() {
        let profile: ProfileConfig =
            serde_json::from_str(r#"{ "rootfs": "/srv/jail" }"#).expect("should parse");
        assert!(profile.bindings.is_empty());
    }
}
