use thiserror::Error;

/// Errors originating from views, viewport state and coordinate transforms.
///
/// The destination variants carry the exact text shown to the user next to
/// the go-to-position form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid view: {reason}")]
    InvalidView { reason: String },

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("Origin is required")]
    OriginRequired,

    #[error("Centre is required")]
    CentreRequired,

    #[error("Axis length must be specified")]
    AxisRequired,

    #[error("invalid output size: {width}×{height}")]
    InvalidOutputSize { width: u32, height: u32 },

    #[error("plot metadata is not available yet")]
    MetadataPending,
}
