use std::fmt;

#[derive(Debug)]
pub enum UploadError {
    Config(String),
    Auth(String),
    Http(reqwest::Error),
    Api { status: u16, message: String },
    Io(std::io::Error),
    InvalidData(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Config(msg) => write!(f, "configuration error: {msg}"),
            UploadError::Auth(msg) => write!(f, "authentication failed: {msg}"),
            UploadError::Http(e) => write!(f, "HTTP error: {e}"),
            UploadError::Api { status, message } => {
                write!(f, "storage API returned {status}: {message}")
            }
            UploadError::Io(e) => write!(f, "I/O error: {e}"),
            UploadError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Http(e)
    }
}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Io(e)
    }
}

impl From<jsonwebtoken::errors::Error> for UploadError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        UploadError::Auth(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
