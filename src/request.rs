//! Inbound and outbound shapes of a single invocation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Sampling temperature used when the caller omits one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// HTTP-style invocation event
///
/// Only `body` is read; every other field of the event is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEvent
{   #[serde(default)]
    pub body: Option<String>
}

impl InvocationEvent
{   pub fn with_body(body: impl Into<String>) -> Self
    {   InvocationEvent { body: Some(body.into()) }
    }
}

/// Response handed back to the invocation runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse
{   #[serde(rename = "statusCode")]
    pub status_code: u16
  , pub headers: BTreeMap<String, String>
  , /// Serialized [`OutboundResponse`]
    pub body: String
}

/// Caller request as it arrives in the event body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundRequest
{   pub prompt: String
  , #[serde(default)]
    pub model_id: Option<String>
  , #[serde(default)]
    pub max_tokens: Option<u32>
  , #[serde(default)]
    pub temperature: Option<f64>
}

impl InboundRequest
{   /// Parse a raw JSON body.
    ///
    /// A blank `prompt` (absent, null, `""`, `false`, zero, `[]` or
    /// `{}`) is rejected before the other fields are type-checked, so it
    /// always reports as [`Error::InvalidRequest`]. Any other non-string
    /// prompt fails deserialization and reports as a failure.
    pub fn parse(body: &str) -> Result<Self, Error>
    {   let value: Value = serde_json::from_str(body)?;
        if !value.is_object()
        {   return Err(Error::Failure(
              "request body must be a JSON object".to_string()
            ));
        }

        if value.get("prompt").map_or(true, is_blank)
        {   return Err(Error::InvalidRequest);
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Fill in defaults for every optional field
    pub fn normalize(
      self
    , default_model_id: &str
    , default_max_tokens: u32
    ) -> NormalizedRequest
    {   NormalizedRequest
        {   prompt: self.prompt
          , model_id: self.model_id
              .unwrap_or_else(|| default_model_id.to_string())
          , max_tokens: self.max_tokens
              .unwrap_or(default_max_tokens)
          , temperature: self.temperature
              .unwrap_or(DEFAULT_TEMPERATURE)
        }
    }
}

fn is_blank(value: &Value) -> bool
{   match value
    {   Value::Null => true
      , Value::Bool(b) => !b
      , Value::Number(n) => n.as_f64() == Some(0.0)
      , Value::String(s) => s.is_empty()
      , Value::Array(a) => a.is_empty()
      , Value::Object(o) => o.is_empty()
    }
}

/// Request with all defaults resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest
{   pub prompt: String
  , pub model_id: String
  , pub max_tokens: u32
  , pub temperature: f64
}

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundResponse
{   Completion
    {   completion: Option<String>
      , model: String
    }
  , Error
    {   error: String
    }
}

impl From<&Error> for OutboundResponse
{   fn from(e: &Error) -> Self
    {   OutboundResponse::Error { error: e.to_string() }
    }
}
