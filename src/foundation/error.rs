/// Convenience result type used across photostrip.
pub type StripResult<T> = Result<T, StripError>;

/// Top-level error taxonomy used by the compositing and sticker APIs.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    /// Invalid user-provided layout, project, or parameter data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source image bytes could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rasterization failed (surface sizing, paint construction).
    #[error("render error: {0}")]
    Render(String),

    /// Encoding or writing the exported raster failed.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing project data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    /// Build a [`StripError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StripError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StripError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StripError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`StripError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures that should turn into a placeholder rather than abort a redraw.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
