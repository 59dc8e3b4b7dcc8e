//! Error types for claque.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaqueError {
    // Share-code (codec) errors
    #[error("Unsupported share code version: {version}")]
    ShareCodeVersion { version: String },

    #[error("Share code is not valid base64: {message}")]
    ShareCodeEncoding { message: String },

    #[error("Share code payload is corrupt: {message}")]
    ShareCodePayload { message: String },

    #[error("Event JSON is malformed: {0}")]
    EventParse(#[from] serde_json::Error),

    #[error("Invalid event data for {field}: {message}")]
    EventValidation { field: String, message: String },

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ClaqueError {
    /// True for any failure that means "this share code / event is bad"
    /// as opposed to an environmental problem. UI layers surface these as
    /// an invalid or corrupt share link.
    pub fn is_invalid_event_data(&self) -> bool {
        matches!(
            self,
            ClaqueError::ShareCodeVersion { .. }
                | ClaqueError::ShareCodeEncoding { .. }
                | ClaqueError::ShareCodePayload { .. }
                | ClaqueError::EventParse(_)
                | ClaqueError::EventValidation { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ClaqueError>;
