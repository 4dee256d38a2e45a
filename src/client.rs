use std::collections::BTreeMap;

use async_trait::async_trait;
use log::{debug, trace, error};
use serde_json::Value;

use crate::config::{AdapterConfig, AwsCredentials};
use crate::error::Error;
use crate::sigv4::{SigV4Signer, BEDROCK_SERVICE};

const JSON: &str = "application/json";

/// Inference backend addressed by model identifier
#[async_trait]
pub trait Backend: Send + Sync
{   /// Send one request body to `model_id` and return its JSON reply
    async fn invoke_model(
      &self
    , model_id: &str
    , body: &Value
    ) -> Result<Value, Error>;
}

/// Bedrock runtime client
///
/// Built once at startup; holds no per-call state.
pub struct BedrockClient
{   http_client: reqwest::Client
  , endpoint: String
  , signer: Option<SigV4Signer>
}

impl BedrockClient
{   pub fn new(config: &AdapterConfig) -> Self
    {   debug!("Creating BedrockClient for {}", config.endpoint_url());
        BedrockClient
        {   http_client: reqwest::Client::new()
          , endpoint: config.endpoint_url()
          , signer: config.credentials.clone().map(
              |c: AwsCredentials| SigV4Signer::new(
                c,
                config.region.clone(),
                BEDROCK_SERVICE
              )
            )
        }
    }

    /// URL of the invoke operation for a model
    pub fn invoke_url(&self, model_id: &str) -> String
    {   format!(
          "{}/model/{}/invoke",
          self.endpoint,
          urlencoding::encode(model_id)
        )
    }
}

#[async_trait]
impl Backend for BedrockClient
{   async fn invoke_model(
      &self
    , model_id: &str
    , body: &Value
    ) -> Result<Value, Error>
    {   let signer = self.signer.as_ref().ok_or_else(|| {
          error!("No credentials to sign request with");
          Error::Failure("Unable to locate credentials".to_string())
        })?;

        let url = self.invoke_url(model_id);
        let body = serde_json::to_vec(body)?;
        trace!("InvokeModel {} body: {}", url, String::from_utf8_lossy(&body));

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), JSON.to_string());
        headers.insert("accept".to_string(), JSON.to_string());
        let headers = signer.sign(
          "POST",
          &url,
          &headers,
          &body,
          chrono::Utc::now()
        )?;

        let mut request = self.http_client.post(&url).body(body);
        for (name, value) in &headers
        {   // reqwest derives host from the URL
            if name != "host"
            {   request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Bedrock response status: {}", status);

        let text = response.text().await?;
        if !status.is_success()
        {   error!("Bedrock API error {}: {}", status, text);
            return Err(Error::Failure(format!(
              "Bedrock returned {}: {}",
              status.as_u16(),
              error_message(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
          error!("Parse error: {}", e);
          Error::from(e)
        })
    }
}

/// `message` from an AWS JSON error body, or the raw text
fn error_message(body: &str) -> String
{   serde_json::from_str::<Value>(body)
      .ok()
      .and_then(|v| {
        v.get("message")
          .or_else(|| v.get("Message"))
          .and_then(Value::as_str)
          .map(str::to_string)
      })
      .unwrap_or_else(|| body.to_string())
}
