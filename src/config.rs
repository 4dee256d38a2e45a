//! Process-wide configuration, read once at startup

use serde::{Deserialize, Serialize};
use log::{debug, info};

use crate::error::Error;
use crate::ProfileKind;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PORT: u16 = 80;

/// Static AWS credentials
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwsCredentials
{   pub access_key_id: String
  , pub secret_access_key: String
  , pub session_token: Option<String>
}

impl std::fmt::Debug for AwsCredentials
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("AwsCredentials")
          .field("access_key_id", &self.access_key_id)
          .field("secret_access_key", &"<redacted>")
          .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
          .finish()
    }
}

/// Adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig
{   /// Backend region
    pub region: String
  , /// Model family requests are shaped for
    pub profile: ProfileKind
  , /// Backend base URL override (regional endpoint when unset)
    pub endpoint: Option<String>
  , /// Credentials used to sign backend calls
    pub credentials: Option<AwsCredentials>
  , /// Port the HTTP server listens on
    pub port: u16
}

impl Default for AdapterConfig
{   fn default() -> Self
    {   AdapterConfig
        {   region: DEFAULT_REGION.to_string()
          , profile: ProfileKind::Generic
          , endpoint: None
          , credentials: None
          , port: DEFAULT_PORT
        }
    }
}

impl AdapterConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let region = get("REGION")
          .or_else(|| get("AWS_REGION"))
          .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let profile = match get("ADAPTER_PROFILE")
        {   Some(name) => name.parse::<ProfileKind>()?
          , None => ProfileKind::Generic
        };

        let port = match get("PORT")
        {   Some(p) => p.parse::<u16>().map_err(|e| {
              Error::InvalidConfiguration(
                format!("PORT {:?}: {}", p, e)
              )
            })?
          , None => DEFAULT_PORT
        };

        let credentials = match (
          get("AWS_ACCESS_KEY_ID"),
          get("AWS_SECRET_ACCESS_KEY")
        )
        {   (Some(access_key_id), Some(secret_access_key)) => {
              Some(AwsCredentials
              {   access_key_id
                , secret_access_key
                , session_token: get("AWS_SESSION_TOKEN")
              })
            }
          , _ => {
              debug!("No static AWS credentials in environment");
              None
            }
        };

        let config = AdapterConfig
        {   region
          , profile
          , endpoint: get("BEDROCK_ENDPOINT")
          , credentials
          , port
        };
        info!(
          "Adapter config: profile={}, region={}, endpoint={}",
          config.profile,
          config.region,
          config.endpoint_url()
        );
        Ok(config)
    }

    /// Base URL backend calls are sent to
    pub fn endpoint_url(&self) -> String
    {   match &self.endpoint
        {   Some(e) => e.trim_end_matches('/').to_string()
          , None => format!(
              "https://bedrock-runtime.{}.amazonaws.com",
              self.region
            )
        }
    }
}
