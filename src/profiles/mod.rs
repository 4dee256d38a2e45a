//! Model-family profiles
//!
//! A profile knows how one model family wants its request body laid
//! out and where it puts the generated text in its reply.

pub mod generic;
pub mod llama;

use serde_json::Value;

use crate::error::Error;
use crate::request::NormalizedRequest;

// Re-export for convenience
pub use generic::GenericProfile;
pub use llama::LlamaProfile;

/// Request/response mapping for one backend model family
pub trait Profile: Send + Sync
{   /// Which family this is
    fn kind(&self) -> crate::ProfileKind;

    /// Model used when the caller does not name one
    fn default_model_id(&self) -> &'static str;

    /// Token limit used when the caller does not give one
    fn default_max_tokens(&self) -> u32;

    /// Backend request body for a normalized request
    fn build_payload(
      &self
    , request: &NormalizedRequest
    ) -> Result<Value, Error>;

    /// Generated text from a backend reply
    fn extract_completion(
      &self
    , response: Value
    ) -> Result<Option<String>, Error>;
}
