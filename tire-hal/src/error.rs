//! Error types for the device layer

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Device layer error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed line in a recording
    #[error("Malformed record on line {line}: {source}")]
    Record {
        /// 1-based line number
        line: usize,
        source: serde_json::Error,
    },

    /// Device not initialized
    #[error("Device not initialized")]
    NotInitialized,

    /// Communication timeout
    #[error("Communication timeout")]
    Timeout,

    /// Recording has no more samples
    #[error("End of recording")]
    EndOfRecording,

    /// The radio scanner was already handed out
    #[error("Radio scanner already taken")]
    ScannerTaken,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),
}
