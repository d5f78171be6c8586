use thiserror::Error;

/// Errors that can occur while building or reading a dependency file
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Inconsistent construction inputs
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("symlink without target")]
    SymlinkWithoutTarget,

    #[error("target without being a symlink")]
    TargetWithoutSymlink,
}

/// Result type alias for dependency file operations
pub type Result<T> = std::result::Result<T, FileError>;
