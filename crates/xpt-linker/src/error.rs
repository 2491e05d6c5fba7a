//! Linking errors.

use thiserror::Error;
use xpt_phf::CapacityError;

/// Errors produced while gathering descriptors or linking them into a
/// source unit. Anything here means the output file was not produced.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("invalid IID '{0}'")]
    InvalidIid(String),

    /// A descriptor reached the linker with a type that has no wire form.
    #[error("type '{0}' is not scriptable")]
    UnsupportedType(String),

    /// A descriptor violates the format's internal rules (missing size_is,
    /// out-of-range index and the like).
    #[error("descriptor for '{name}' is malformed: {message}")]
    InvalidDescriptor { name: String, message: String },

    /// A parent link loop; the input was not produced by the resolver.
    #[error("base chain of '{0}' does not terminate")]
    BaseChainCycle(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LinkError {
    pub fn malformed(name: impl Into<String>, message: impl Into<String>) -> Self {
        LinkError::InvalidDescriptor {
            name: name.into(),
            message: message.into(),
        }
    }
}
