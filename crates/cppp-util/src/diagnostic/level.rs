//! Diagnostic severity.

use std::fmt;

/// Severity of a [`crate::Diagnostic`].
///
/// This matches the driver-facing diagnostics format exactly (spec §6):
/// `(severity ∈ {Warning, Error, Fatal}, source_name, line, col, message)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Non-fatal: recorded, processing continues (`#warning`, unused-ish
    /// conformance notes).
    Warning,
    /// The offending construct is skipped but the session keeps scanning for
    /// further diagnostics (§7 propagation rules).
    Error,
    /// Stops the session outright; whatever tokens were already emitted and
    /// whatever diagnostics were already recorded are returned to the host.
    Fatal,
}

impl Level {
    pub fn is_error(self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }

    pub fn is_fatal(self) -> bool {
        matches!(self, Level::Fatal)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal error"),
        }
    }
}
