use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, trace};

use crate::error::Error;
use crate::request::NormalizedRequest;

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-v2";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub prompt: String
  , pub max_tokens: u32
  , pub temperature: f64
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse
{   #[serde(default)]
    pub completion: Option<String>
  , #[serde(default)]
    pub stop_reason: Option<String>
}

/// Frame a prompt the way completion-style models expect a turn
pub fn wrap_prompt(prompt: &str) -> String
{   format!("\n\nHuman: {}\n\nAssistant:", prompt)
}

// ===== Profile =====

/// Plain completion profile: templated prompt, `completion` in reply
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericProfile;

impl crate::profiles::Profile for GenericProfile
{   fn kind(&self) -> crate::ProfileKind
    {   crate::ProfileKind::Generic
    }

    fn default_model_id(&self) -> &'static str
    {   DEFAULT_MODEL_ID
    }

    fn default_max_tokens(&self) -> u32
    {   DEFAULT_MAX_TOKENS
    }

    fn build_payload(
      &self
    , request: &NormalizedRequest
    ) -> Result<Value, Error>
    {   let payload = CompletionRequest
        {   prompt: wrap_prompt(&request.prompt)
          , max_tokens: request.max_tokens
          , temperature: request.temperature
        };
        trace!("Completion payload: {:?}", payload);
        Ok(serde_json::to_value(payload)?)
    }

    fn extract_completion(
      &self
    , response: Value
    ) -> Result<Option<String>, Error>
    {   let parsed: CompletionResponse
          = serde_json::from_value(response)?;
        debug!("Completion stop_reason: {:?}", parsed.stop_reason);
        Ok(parsed.completion)
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::profiles::Profile;
    use serde_json::json;

    fn hello() -> NormalizedRequest
    {   NormalizedRequest
        {   prompt: "Hello".to_string()
          , model_id: DEFAULT_MODEL_ID.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
          , temperature: 0.7
        }
    }

    #[test]
    fn payload_wraps_prompt_in_turn_template()
    {   let payload = GenericProfile.build_payload(&hello()).unwrap();
        assert_eq!(
          payload,
          json!({
            "prompt": "\n\nHuman: Hello\n\nAssistant:",
            "max_tokens": 1000,
            "temperature": 0.7
          })
        );
    }

    #[test]
    fn completion_is_passed_through()
    {   let text = GenericProfile
          .extract_completion(json!({
            "completion": "Hi there",
            "stop_reason": "stop_sequence"
          }))
          .unwrap();
        assert_eq!(text.as_deref(), Some("Hi there"));
    }

    #[test]
    fn absent_completion_is_null()
    {   let text = GenericProfile
          .extract_completion(json!({"other": 1}))
          .unwrap();
        assert_eq!(text, None);
    }

    #[test]
    fn non_object_reply_fails()
    {   let err = GenericProfile
          .extract_completion(json!("just text"))
          .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
