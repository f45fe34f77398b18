use crate::registry::ComponentKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordpipeError {
    #[error("{kind} '{id}' already registered")]
    DuplicateComponent { kind: ComponentKind, id: String },

    #[error("Unknown {kind} '{id}'")]
    UnknownComponent { kind: ComponentKind, id: String },

    #[error("Pipeline spec missing {0}")]
    MissingField(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WordpipeError>;
