//! Error types for Sentra.

use thiserror::Error;

/// Sentra error types.
#[derive(Error, Debug)]
pub enum SentraError {
    /// Filesystem error while reading or writing a blob or store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Prototype blob does not start with `SVEC`
    #[error("Invalid magic number in prototype blob: {found:?}")]
    InvalidMagic { found: [u8; 4] },

    /// Prototype blob header disagrees with the compiled-in layout
    #[error("Prototype blob is {count}x{width}, expected {expected_count}x{expected_width}")]
    HeaderMismatch {
        count: u32,
        width: u32,
        expected_count: u32,
        expected_width: u32,
    },

    /// Prototype blob body is shorter than its header promises
    #[error("Prototype blob truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// Invalid vector dimensions
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Hex-encoded vector could not be decoded
    #[error("Invalid hex vector: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A skill with this id is already registered
    #[error("Duplicate skill id: {0}")]
    DuplicateSkill(String),

    /// No skill with this id is registered
    #[error("Unknown skill id: {0}")]
    UnknownSkill(String),

    /// Empty input where non-empty was required
    #[error("Empty input: {0}")]
    EmptyInput(String),
}

/// Result type alias for Sentra operations.
pub type Result<T> = std::result::Result<T, SentraError>;
