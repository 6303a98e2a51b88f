use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write report artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report artifact: {0}")]
    Serialization(#[from] serde_json::Error),
}
