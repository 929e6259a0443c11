/// Convenience result type used across framebake.
pub type BakeResult<T> = Result<T, BakeError>;

/// Top-level error taxonomy used by the export pipeline.
///
/// The first four variants are setup errors: they are raised before the frame stepper enters its
/// stepping state, so no render resources are held when they surface.
#[derive(thiserror::Error, Debug)]
pub enum BakeError {
    /// The source has neither a video nor an audio stream.
    #[error("empty media: {0}")]
    EmptyMedia(String),

    /// No writer plugin recognizes the output extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A plugin recognized the format but could not open the destination.
    #[error("writer open error: {0}")]
    WriterOpen(String),

    /// Offscreen storage could not be allocated.
    #[error("resource allocation error: {0}")]
    ResourceAllocation(String),

    /// A pixel type has no transfer format, or does not match the destination image.
    #[error("invalid pixel format: {0}")]
    InvalidPixelFormat(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while drawing or reading back a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Failure while streaming samples into an open writer.
    #[error("writer error: {0}")]
    Writer(String),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BakeError {
    /// Build a [`BakeError::EmptyMedia`] value.
    pub fn empty_media(msg: impl Into<String>) -> Self {
        Self::EmptyMedia(msg.into())
    }

    /// Build a [`BakeError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`BakeError::WriterOpen`] value.
    pub fn writer_open(msg: impl Into<String>) -> Self {
        Self::WriterOpen(msg.into())
    }

    /// Build a [`BakeError::ResourceAllocation`] value.
    pub fn resource_allocation(msg: impl Into<String>) -> Self {
        Self::ResourceAllocation(msg.into())
    }

    /// Build a [`BakeError::InvalidPixelFormat`] value.
    pub fn invalid_pixel_format(msg: impl Into<String>) -> Self {
        Self::InvalidPixelFormat(msg.into())
    }

    /// Build a [`BakeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BakeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BakeError::Writer`] value.
    pub fn writer(msg: impl Into<String>) -> Self {
        Self::Writer(msg.into())
    }

    /// Return `true` for errors that can only happen before stepping starts.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyMedia(_)
                | Self::UnsupportedFormat(_)
                | Self::WriterOpen(_)
                | Self::ResourceAllocation(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
