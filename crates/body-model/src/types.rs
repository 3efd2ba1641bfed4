// Re-export shared types from body-types
pub use body_types::{ParameterAssignment, ShapeParameter};

/// Errors from shape model queries and updates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("parameter not found: {name}")]
    ParameterNotFound { name: String },

    #[error("vertex {index} out of range (mesh has {count} vertices)")]
    VertexOutOfRange { index: usize, count: usize },

    #[error("invalid modifier {name}: {reason}")]
    InvalidModifier { name: String, reason: String },
}
