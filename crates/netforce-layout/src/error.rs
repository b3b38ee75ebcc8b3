//! Error types for layout operations.

use thiserror::Error;

/// Errors that can occur while setting up or running a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A point was given a negative mass.
    #[error("point mass must be non-negative, got {mass}")]
    NegativeMass { mass: f64 },

    /// A configuration knob is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Passthrough setup found a movable point without a position.
    #[error("no initial position supplied for vertex {vertex}")]
    MissingInitialPosition { vertex: String },

    /// Stepping was requested before points were placed.
    #[error("layout not initialized")]
    NotInitialized,

    /// Failed to write a debug export.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
