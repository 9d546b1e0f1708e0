//! Error types for surfer-agent

use thiserror::Error;

use crate::browser::BrowserError;

/// Result type alias using surfer-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the provider layer
    #[error(transparent)]
    Ai(#[from] surfer_ai::Error),

    /// A browser collaborator operation failed
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl Error {
    /// One-line text shown to the user in place of an answer
    pub fn user_message(&self) -> String {
        format!("Error: {}", self)
    }
}
