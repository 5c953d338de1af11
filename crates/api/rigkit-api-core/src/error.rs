//! Error taxonomy shared across the Rigkit crates.
//!
//! All of these are unrecoverable at the point raised: the assembly layer
//! propagates them without catching, and the caller is expected to discard
//! the partially built character (see `BuildContext::cleanup` in the
//! assembly crate) before retrying.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    /// A name does not contain the segment required by a requested tag or
    /// index, or does not follow the segmented layout at all.
    #[error("malformed name `{name}`: {reason}")]
    MalformedName { name: String, reason: String },

    /// A required joint, descendant, or existing node is missing before an
    /// assembly step.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Unique-name resolution for a duplicated chain did not terminate
    /// within the retry bound. Unreachable under monotonic tag growth;
    /// raised defensively.
    #[error("duplication conflict: could not settle a unique name for `{0}`")]
    DuplicationConflict(String),

    /// Requested constraint/solver kind is not usable here, or a blend was
    /// requested over something other than two influences.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A node id or node name did not resolve in the scene backend.
    #[error("missing node `{0}`")]
    MissingNode(String),
}

impl RigError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        RigError::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RigError>;
