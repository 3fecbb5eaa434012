use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Message returned when a generation fails without anything more specific
pub const FALLBACK_MESSAGE: &str = "Failed to generate design";

/// Custom error type for AutoArch operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error
{   /// Request failed validation before reaching the provider
    #[error("{0}")]
    Validation(String)
  , /// Request body was not the expected JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String)
  , /// Request body is over the accepted size, in bytes
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize)
  , /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String)
  , /// API key is missing for a provider
    #[error("Missing API key for: {0}")]
    MissingApiKey(String)
  , /// Provider returned an error status or could not be reached
    #[error("Groq API error: {0}")]
    UpstreamService(String)
  , /// Provider answered but the completion carried no text
    #[error("Groq API error: No response from Groq API")]
    EmptyCompletion
  , /// Provider call exceeded the configured timeout
    #[error("Groq API error: request timed out")]
    Timeout
  , /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String)
  , /// Anything else raised while orchestrating a request
    #[error("{0}")]
    Unexpected(String)
}

impl Error
{   /// Wrap an unexpected failure, falling back to a generic message
    /// when the cause carries no text of its own
    pub fn unexpected(msg: impl Into<String>) -> Self
    {   let msg = msg.into();
        if msg.trim().is_empty()
        {   Error::Unexpected(FALLBACK_MESSAGE.to_string())
        } else
        {   Error::Unexpected(msg)
        }
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::unexpected(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::unexpected(s)
    }
}

/// JSON body of every error response: `{ "error": "..." }`
#[derive(Debug, Serialize)]
struct ErrorBody
{   error: String
}

impl ResponseError for Error
{   fn status_code(&self) -> StatusCode
    {   match self
        {   Error::Validation(_)
          | Error::InvalidBody(_) => StatusCode::BAD_REQUEST
          , Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE
          , Error::NotFound(_) => StatusCode::NOT_FOUND
          , Error::MissingApiKey(_)
          | Error::UpstreamService(_)
          | Error::EmptyCompletion
          | Error::Timeout
          | Error::InvalidConfiguration(_)
          | Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse
    {   HttpResponse::build(self.status_code())
          .json(ErrorBody { error: self.to_string() })
    }
}
