use thiserror::Error;

/// Errors that can occur while tracing an image or reading/writing strips.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("failed to save image: {0}")]
    ImageSave(String),

    #[error("no contour found in image")]
    NoContours,

    #[error("empty strip")]
    EmptyStrip,

    /// A count does not fit the one-byte length field of the strip format.
    #[error("encoding overflow: {count} {what} (max 255)")]
    EncodingOverflow { what: &'static str, count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load configuration: {0}")]
    Config(String),

    #[error("truncated input at byte {offset}")]
    Truncated { offset: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
