//! Engine error taxonomy.

use orrery_math::Vector3;

/// Errors produced by the celestial mechanics engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MechanicsError {
    /// A configured or supplied value is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// A calculation produced NaN or infinity.
    #[error("computation produced a non-finite {quantity}")]
    Computation {
        /// The quantity that became non-finite.
        quantity: &'static str,
    },

    /// No body with this id is registered.
    #[error("unknown body `{0}`")]
    UnknownBody(String),

    /// Two descriptors share an id.
    #[error("duplicate body id `{0}`")]
    DuplicateBody(String),

    /// A descriptor names a parent that does not exist.
    #[error("body `{body}` references missing parent `{parent}`")]
    MissingParent {
        /// The child body.
        body: String,
        /// The parent id it references.
        parent: String,
    },

    /// Parent references loop back on themselves.
    #[error("parent chain of `{0}` forms a cycle")]
    ParentCycle(String),
}

impl MechanicsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, MechanicsError>;

/// Pass `value` through, or fail with [`MechanicsError::Computation`].
pub(crate) fn finite(value: f64, quantity: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MechanicsError::Computation { quantity })
    }
}

/// Vector flavour of [`finite`].
pub(crate) fn finite_vector(value: Vector3, quantity: &'static str) -> Result<Vector3> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MechanicsError::Computation { quantity })
    }
}
