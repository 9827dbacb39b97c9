//! Scene loading and saving errors

use thiserror::Error;

/// Scene document errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Reading or writing the scene file failed
    #[error("Scene IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML
    #[error("Scene parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document could not be written as TOML
    #[error("Scene serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The document is valid TOML but not a scene
    #[error("Invalid scene document: {0}")]
    InvalidDocument(String),
}

/// Result alias for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
