//! Unified error types for the vroot workspace.
//!
//! The translation core reports failures as the errno the supervisor must
//! hand back to the tracee, so every engine-side variant maps onto exactly
//! one host errno. The remaining variants cover the cold paths (profile
//! loading, serialization) the way the rest of the workspace expects.

use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum VrootError {
    /// A path component or an assembled path would exceed its bound.
    #[error("path or component too long")]
    NameTooLong,

    /// A non-final component resolves to a non-directory, or a directory
    /// anchor does not refer to a directory.
    #[error("not a directory")]
    NotADirectory,

    /// A non-final component does not exist on the host.
    #[error("no such file or directory")]
    NoEntry,

    /// The symbolic link dereference limit is exceeded.
    #[error("too many levels of symbolic links")]
    TooManyLinks,

    /// Detranslation would expose a path outside the guest rootfs.
    #[error("permission denied")]
    PermissionDenied,

    /// A host syscall failed unexpectedly during anchor resolution.
    #[error("operation failed")]
    OperationFailed,

    /// A path argument violates a caller-side contract, such as a relative
    /// canonicalization base.
    #[error("invalid path")]
    InvalidPath,

    /// An underlying host syscall failed; its raw errno is surfaced as-is.
    #[error("host syscall failed: {0}")]
    Host(Errno),

    /// An I/O operation outside the translation hot path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A profile is invalid.
    #[error("invalid profile: {message}")]
    Profile {
        /// Description of the invalid profile.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl VrootError {
    /// Host errno equivalent of this error.
    #[must_use]
    pub fn errno(&self) -> Errno {
        match self {
            Self::NameTooLong => Errno::ENAMETOOLONG,
            Self::NotADirectory => Errno::ENOTDIR,
            Self::NoEntry => Errno::ENOENT,
            Self::TooManyLinks => Errno::ELOOP,
            Self::PermissionDenied | Self::OperationFailed => Errno::EPERM,
            Self::InvalidPath | Self::Profile { .. } | Self::Serialization { .. } => Errno::EINVAL,
            Self::Host(errno) => *errno,
            Self::Io { source, .. } => source.raw_os_error().map_or(Errno::EIO, Errno::from_raw),
        }
    }

    /// Negative raw errno, the form in which syscall results reach the
    /// tracee.
    #[must_use]
    pub fn to_raw(&self) -> i32 {
        -(self.errno() as i32)
    }

    /// Wraps a host syscall failure, keeping its raw errno when there is
    /// one.
    #[must_use]
    pub fn from_io(err: &std::io::Error) -> Self {
        err.raw_os_error()
            .map_or(Self::OperationFailed, |raw| Self::Host(Errno::from_raw(raw)))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VrootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_their_errno() {
        assert_eq!(VrootError::NameTooLong.errno(), Errno::ENAMETOOLONG);
        assert_eq!(VrootError::NotADirectory.errno(), Errno::ENOTDIR);
        assert_eq!(VrootError::NoEntry.errno(), Errno::ENOENT);
        assert_eq!(VrootError::TooManyLinks.errno(), Errno::ELOOP);
        assert_eq!(VrootError::PermissionDenied.errno(), Errno::EPERM);
    }

    #[test]
    fn raw_form_is_negative() {
        assert_eq!(VrootError::NoEntry.to_raw(), -(Errno::ENOENT as i32));
        assert!(VrootError::TooManyLinks.to_raw() < 0);
    }

    #[test]
    fn io_error_keeps_the_host_errno() {
        let io = std::io::Error::from_raw_os_error(Errno::ENOENT as i32);
        let err = VrootError::from_io(&io);
        assert_eq!(err.errno(), Errno::ENOENT);
    }
}
