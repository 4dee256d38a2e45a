use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, trace};

use crate::error::Error;
use crate::request::NormalizedRequest;

pub const DEFAULT_MODEL_ID: &str
  = "meta.llama3-2-90b-instruct-v1:0";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Deployed prompt template every Llama request is routed through
pub const PROMPT_ARN: &str
  = "arn:aws:bedrock:us-west-2:381492005022:prompt/4NLYS6J1L0";

/// Content-safety guardrail applied to every Llama request
pub const GUARDRAIL_ARN: &str
  = "arn:aws:bedrock:us-west-2:381492005022:guardrail/k6tcx8eogg3w";

/// Nucleus sampling, not caller-configurable
pub const TOP_P: f64 = 0.9;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlamaRequest
{   #[serde(rename = "promptArn")]
    pub prompt_arn: String
  , #[serde(rename = "guardrailArn")]
    pub guardrail_arn: String
  , pub prompt: String
  , pub max_gen_len: u32
  , pub temperature: f64
  , pub top_p: f64
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlamaResponse
{   #[serde(default)]
    pub generation: Option<String>
  , #[serde(default)]
    pub prompt_token_count: Option<u64>
  , #[serde(default)]
    pub generation_token_count: Option<u64>
  , #[serde(default)]
    pub stop_reason: Option<String>
}

// ===== Profile =====

/// Llama profile: verbatim prompt plus fixed routing identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct LlamaProfile;

impl crate::profiles::Profile for LlamaProfile
{   fn kind(&self) -> crate::ProfileKind
    {   crate::ProfileKind::Llama
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
    {   let payload = LlamaRequest
        {   prompt_arn: PROMPT_ARN.to_string()
          , guardrail_arn: GUARDRAIL_ARN.to_string()
          , prompt: request.prompt.clone()
          , max_gen_len: request.max_tokens
          , temperature: request.temperature
          , top_p: TOP_P
        };
        trace!("Llama payload: {:?}", payload);
        Ok(serde_json::to_value(payload)?)
    }

    fn extract_completion(
      &self
    , response: Value
    ) -> Result<Option<String>, Error>
    {   let parsed: LlamaResponse
          = serde_json::from_value(response)?;
        debug!(
          "Llama tokens in/out: {:?}/{:?}, stop_reason: {:?}",
          parsed.prompt_token_count,
          parsed.generation_token_count,
          parsed.stop_reason
        );
        Ok(Some(parsed.generation.unwrap_or_default()))
    }
}
