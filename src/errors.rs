use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("no branch specified and HEAD is not on a branch")]
    NoBranchSpecified,

    #[error("Branch '{0}' not found")]
    BranchNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
