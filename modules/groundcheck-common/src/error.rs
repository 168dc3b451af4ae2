use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroundcheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
