use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access cookie file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse cookie file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required environment variables: {0}")]
    MissingEnv(String),

    #[error("Invalid CDP endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
