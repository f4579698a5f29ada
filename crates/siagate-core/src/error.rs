use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Frame too large: {size} bytes exceeds maximum of {max_size} bytes")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error("Invalid timestamp literal: {0}")]
    InvalidTimestamp(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
