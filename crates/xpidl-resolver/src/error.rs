//! Resolution-stage errors and warnings.

use thiserror::Error;
use xpidl_parser::{Location, ParseError};

/// Errors produced while resolving an IDL file. Resolution stops at the
/// first error; warnings accumulate on the resolver instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A name was declared twice, shadows a builtin, or cannot be found.
    #[error("{location}: {message}")]
    Name { message: String, location: Location },

    /// A declaration names a type that exists but cannot be used there.
    #[error("{location}: {message}")]
    Type { message: String, location: Location },

    /// A structural rule was violated (attribute misuse, retval position,
    /// vtable size and the like).
    #[error("{location}: {message}")]
    Constraint { message: String, location: Location },

    #[error("{location}: file '{filename}' not found")]
    FileNotFound { filename: String, location: Location },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub fn name(message: impl Into<String>, location: Location) -> Self {
        ResolveError::Name {
            message: message.into(),
            location,
        }
    }

    pub fn ty(message: impl Into<String>, location: Location) -> Self {
        ResolveError::Type {
            message: message.into(),
            location,
        }
    }

    pub fn constraint(message: impl Into<String>, location: Location) -> Self {
        ResolveError::Constraint {
            message: message.into(),
            location,
        }
    }
}

/// A type has no representation for the requested target or calltype.
/// Recoverable: binding emitters skip the member and move on.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}, {location}")]
pub struct UnsupportedTargetError {
    pub message: String,
    pub location: Location,
}

impl UnsupportedTargetError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        UnsupportedTargetError {
            message: message.into(),
            location,
        }
    }
}

/// A non-fatal finding collected during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    pub location: Location,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warning: {}, {}", self.message, self.location)
    }
}
