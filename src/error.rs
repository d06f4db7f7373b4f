//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("No image selected")]
    MissingInput,

    #[error("Malformed dialogue response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_a_message() {
        let samples = [
            Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
            Error::AiProvider("quota".to_string()),
            Error::MissingInput,
            Error::MalformedResponse("empty".to_string()),
            Error::UnsupportedMedia("text/plain".to_string()),
            Error::Speech("no engine".to_string()),
            Error::Config("no key".to_string()),
        ];
        for err in &samples {
            // Exhaustive so a new variant has to be added here too.
            let prefix = match err {
                Error::Io(_) => "IO error",
                Error::Http(_) => "HTTP request error",
                Error::AiProvider(_) => "AI provider error",
                Error::MissingInput => "No image selected",
                Error::MalformedResponse(_) => "Malformed dialogue response",
                Error::UnsupportedMedia(_) => "Unsupported media type",
                Error::Speech(_) => "Speech synthesis error",
                Error::Config(_) => "Configuration error",
            };
            assert!(err.to_string().starts_with(prefix), "{}", err);
        }
    }
}
