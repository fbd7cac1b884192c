//! System-wide constants and default limits.

/// Upper bound on a whole path in bytes, including the terminating NUL of
/// the C ABI the supervisor speaks.
pub const PATH_MAX: usize = 4096;

/// Upper bound on a single path component in bytes, including the
/// terminating NUL.
pub const NAME_MAX: usize = 255;

/// Maximum number of symbolic link dereferences in one canonicalization.
pub const SYMLINK_LIMIT: u32 = 40;

/// Mount point of the proc pseudo-filesystem.
pub const PROC_ROOT: &[u8] = b"/proc";

/// Default guest rootfs when none is configured.
pub const DEFAULT_ROOTFS: &str = "/";

/// Application name used in CLI output.
pub const APP_NAME: &str = "vroot";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "vroot";
