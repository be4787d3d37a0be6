use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),
    #[error("failed to draw frame: {0}")]
    Render(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
