//! Domain primitive types used across the vroot workspace.

use std::fmt;

/// Position of a path component within its path, as reported by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finality {
    /// More components follow.
    NotFinal,
    /// Last component of the path, no trailing separator.
    FinalNormal,
    /// Last component of the path, followed by a trailing separator; the
    /// caller expects a directory.
    FinalSlash,
}

impl Finality {
    /// Whether this component ends the path.
    #[must_use]
    pub fn is_final(self) -> bool {
        !matches!(self, Self::NotFinal)
    }
}

/// Outcome of comparing two canonical paths component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both paths name the same entry.
    Equal,
    /// The first path is a strict prefix of the second.
    Path1IsPrefix,
    /// The second path is a strict prefix of the first.
    Path2IsPrefix,
    /// Neither path is a component-wise prefix of the other.
    NotComparable,
}

/// Namespace a path is expressed in; selects the binding lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Path as the tracee sees it, rooted at the synthetic `/`.
    Guest,
    /// Path the host kernel accepts, rooted at the real `/`.
    Host,
}

impl Side {
    /// The opposite namespace.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Guest => Self::Host,
            Self::Host => Self::Guest,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Host => write!(f, "host"),
        }
    }
}
