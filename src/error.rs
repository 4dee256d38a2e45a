use std::fmt;

/// Message returned to callers when the prompt is missing
pub const PROMPT_REQUIRED: &str = "prompt is required";

/// Error type for adapter operations
///
/// Invocations only ever surface two kinds: a rejected request (400)
/// or a failure of anything else (500). Failures keep the underlying
/// error text unfiltered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Prompt missing or empty
    InvalidRequest
  , /// Parse, backend or internal failure
    Failure(String)
  , /// Startup configuration rejected
    InvalidConfiguration(String)
}

impl Error
{   /// HTTP status this error is reported with
    pub fn status_code(&self) -> u16
    {   match self
        {   Error::InvalidRequest => 400
          , Error::Failure(_)
          | Error::InvalidConfiguration(_) => 500
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidRequest => {
              write!(f, "{}", PROMPT_REQUIRED)
            }
          , Error::Failure(msg) => {
              write!(f, "{}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Failure(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Failure(s.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Failure(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::Failure(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn invalid_request_is_a_400()
    {   assert_eq!(Error::InvalidRequest.status_code(), 400);
        assert_eq!(
          Error::InvalidRequest.to_string(),
          "prompt is required"
        );
    }

    #[test]
    fn failures_keep_their_message()
    {   let err = Error::from("connection refused");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "connection refused");
    }
}
