pub mod error;
pub mod config;
pub mod request;
pub mod profiles;
pub mod sigv4;
pub mod client;
pub mod adapter;
pub mod server;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use adapter::Adapter;
pub use client::{Backend, BedrockClient};
pub use config::AdapterConfig;
pub use error::Error;
pub use request::{InvocationEvent, InvocationResponse, OutboundResponse};

/*

bedrock-adapter: forwards one prompt per invocation to a Bedrock model
and reshapes the reply into `{completion, model}` or `{error}`.

bedrock-adapter/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and ProfileKind
│   ├── main.rs         # Binary: logging, config, HTTP server
│   ├── error.rs        # Flat error type (400 vs 500)
│   ├── config.rs       # Environment configuration
│   ├── request.rs      # Event, request and envelope types
│   ├── profiles/       # Per model family request/response mapping
│   │   ├── mod.rs      # Profile trait
│   │   ├── generic.rs  # Completion-style models
│   │   └── llama.rs    # Llama models behind prompt + guardrail
│   ├── sigv4.rs        # AWS request signing
│   ├── client.rs       # Backend trait and Bedrock client
│   ├── adapter.rs      # The invocation pipeline
│   └── server.rs       # axum routes
└── tests/              # Pipeline tests against a fake Bedrock

*/

/// Model families the adapter can shape requests for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind
{   /// Completion models framed with a Human/Assistant turn template
    Generic
  , /// Meta Llama models routed through a prompt and guardrail
    Llama
}

impl ProfileKind
{   /// Profile implementation for this family
    pub fn profile(self) -> Arc<dyn profiles::Profile>
    {   match self
        {   ProfileKind::Generic => Arc::new(profiles::GenericProfile)
          , ProfileKind::Llama => Arc::new(profiles::LlamaProfile)
        }
    }
}

impl fmt::Display for ProfileKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   ProfileKind::Generic => write!(f, "generic")
          , ProfileKind::Llama => write!(f, "llama")
        }
    }
}

impl FromStr for ProfileKind
{   type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "generic" => Ok(ProfileKind::Generic)
          , "llama" => Ok(ProfileKind::Llama)
          , other => Err(Error::InvalidConfiguration(
              format!("unknown profile: {}", other)
            ))
        }
    }
}
