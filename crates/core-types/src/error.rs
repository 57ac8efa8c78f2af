use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Document is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
