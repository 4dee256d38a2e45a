//! Single-pass invocation pipeline:
//! parse → validate → build payload → call backend → extract → envelope

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error, info};

use crate::client::{Backend, BedrockClient};
use crate::config::AdapterConfig;
use crate::error::Error;
use crate::profiles::Profile;
use crate::request::{
  InboundRequest, InvocationEvent, InvocationResponse, OutboundResponse
};

/// Request adapter for one profile and one backend
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct Adapter
{   profile: Arc<dyn Profile>
  , backend: Arc<dyn Backend>
}

impl Adapter
{   pub fn new(
      profile: Arc<dyn Profile>
    , backend: Arc<dyn Backend>
    ) -> Self
    {   debug!("Creating Adapter for {} profile", profile.kind());
        Adapter { profile, backend }
    }

    /// Adapter backed by a Bedrock client, profile chosen by config
    pub fn from_config(config: &AdapterConfig) -> Self
    {   Adapter::new(
          config.profile.profile(),
          Arc::new(BedrockClient::new(config))
        )
    }

    /// Run one request body through the backend.
    ///
    /// Nothing is sent to the backend unless the body parses and
    /// carries a prompt.
    pub async fn handle(&self, body: &str)
      -> Result<OutboundResponse, Error>
    {   let request = InboundRequest::parse(body)?
          .normalize(
            self.profile.default_model_id(),
            self.profile.default_max_tokens()
          );
        debug!(
          "Invoking {} (max_tokens={}, temperature={})",
          request.model_id, request.max_tokens, request.temperature
        );

        let payload = self.profile.build_payload(&request)?;
        let reply = self.backend
          .invoke_model(&request.model_id, &payload)
          .await?;
        let completion = self.profile.extract_completion(reply)?;

        Ok(OutboundResponse::Completion
        {   completion
          , model: request.model_id
        })
    }

    /// Handle a whole invocation event, never failing.
    pub async fn handle_event(&self, event: InvocationEvent)
      -> InvocationResponse
    {   let result = match event.body.as_deref()
        {   Some(body) => self.handle(body).await
          , None => Err(Error::Failure(
              "request body is missing".to_string()
            ))
        };

        match result
        {   Ok(envelope) => {
              info!("Invocation succeeded");
              respond(200, &envelope, true)
            }
          , Err(e) => {
              if e.status_code() >= 500
              {   error!("Invocation failed: {}", e);
              } else
              {   info!("Invocation rejected: {}", e);
              }
              respond(e.status_code(), &OutboundResponse::from(&e), false)
            }
        }
    }
}

fn respond(
  status_code: u16
, envelope: &OutboundResponse
, allow_any_origin: bool
) -> InvocationResponse
{   let mut headers = BTreeMap::new();
    headers.insert(
      "Content-Type".to_string(),
      "application/json".to_string()
    );
    if allow_any_origin
    {   headers.insert(
          "Access-Control-Allow-Origin".to_string(),
          "*".to_string()
        );
    }

    // An envelope is strings only, so this cannot fail in practice
    let body = serde_json::to_string(envelope)
      .unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e));

    InvocationResponse { status_code, headers, body }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::profiles::{GenericProfile, LlamaProfile};

    /// Backend stub that records every call and replays a fixed reply
    struct StubBackend
    {   reply: Result<Value, Error>
      , calls: Mutex<Vec<(String, Value)>>
    }

    impl StubBackend
    {   fn replying(reply: Result<Value, Error>) -> Arc<Self>
        {   Arc::new(StubBackend
            {   reply
              , calls: Mutex::new(vec![])
            })
        }

        fn calls(&self) -> Vec<(String, Value)>
        {   self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for StubBackend
    {   async fn invoke_model(
          &self
        , model_id: &str
        , body: &Value
        ) -> Result<Value, Error>
        {   self.calls.lock().unwrap()
              .push((model_id.to_string(), body.clone()));
            self.reply.clone()
        }
    }

    fn body_of(response: &InvocationResponse) -> Value
    {   serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn missing_prompt_never_reaches_backend()
    {   let backend = StubBackend::replying(Ok(json!({})));
        let adapter = Adapter::new(
          Arc::new(GenericProfile),
          backend.clone()
        );

        for body in [r#"{}"#, r#"{"prompt":""}"#, r#"{"prompt":false}"#, r#"{"prompt":0}"#]
        {   let response = adapter
              .handle_event(InvocationEvent::with_body(body))
              .await;
            assert_eq!(response.status_code, 400);
            assert_eq!(
              body_of(&response),
              json!({"error": "prompt is required"})
            );
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn generic_profile_round_trip()
    {   let backend = StubBackend::replying(
          Ok(json!({"completion": "Hi there"}))
        );
        let adapter = Adapter::new(
          Arc::new(GenericProfile),
          backend.clone()
        );

        let response = adapter
          .handle_event(InvocationEvent::with_body(r#"{"prompt":"Hello"}"#))
          .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
          response.headers["Access-Control-Allow-Origin"],
          "*"
        );
        assert_eq!(
          body_of(&response),
          json!({"completion": "Hi there", "model": "anthropic.claude-v2"})
        );
        assert_eq!(
          backend.calls(),
          vec![(
            "anthropic.claude-v2".to_string(),
            json!({
              "prompt": "\n\nHuman: Hello\n\nAssistant:",
              "max_tokens": 1000,
              "temperature": 0.7
            })
          )]
        );
    }

    #[tokio::test]
    async fn llama_profile_round_trip()
    {   let backend = StubBackend::replying(
          Ok(json!({"generation": "Hi there"}))
        );
        let adapter = Adapter::new(
          Arc::new(LlamaProfile),
          backend.clone()
        );

        let response = adapter
          .handle(r#"{"prompt":"Hello","model_id":"meta.llama3-8b","temperature":0.2}"#)
          .await
          .unwrap();
        assert_eq!(
          response,
          OutboundResponse::Completion
          {   completion: Some("Hi there".to_string())
            , model: "meta.llama3-8b".to_string()
          }
        );

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let (model, payload) = &calls[0];
        assert_eq!(model, "meta.llama3-8b");
        assert_eq!(payload["prompt"], "Hello");
        assert_eq!(payload["max_gen_len"], 4000);
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["top_p"], 0.9);
        assert!(payload.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn backend_failure_is_a_500_with_its_message()
    {   let backend = StubBackend::replying(
          Err(Error::Failure("Bedrock returned 403: denied".to_string()))
        );
        let adapter = Adapter::new(Arc::new(GenericProfile), backend);

        let response = adapter
          .handle_event(InvocationEvent::with_body(r#"{"prompt":"Hello"}"#))
          .await;
        assert_eq!(response.status_code, 500);
        assert_eq!(
          body_of(&response),
          json!({"error": "Bedrock returned 403: denied"})
        );
        assert!(!response.headers.contains_key("Access-Control-Allow-Origin"));
    }

    #[tokio::test]
    async fn missing_body_is_a_500()
    {   let backend = StubBackend::replying(Ok(json!({})));
        let adapter = Adapter::new(Arc::new(GenericProfile), backend.clone());

        let response = adapter
          .handle_event(InvocationEvent::default())
          .await;
        assert_eq!(response.status_code, 500);
        assert_eq!(
          body_of(&response),
          json!({"error": "request body is missing"})
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn identical_input_gives_identical_output()
    {   let backend = StubBackend::replying(
          Ok(json!({"completion": "same"}))
        );
        let adapter = Adapter::new(Arc::new(GenericProfile), backend.clone());
        let event = InvocationEvent::with_body(r#"{"prompt":"again"}"#);

        let first = adapter.handle_event(event.clone()).await;
        let second = adapter.handle_event(event).await;
        assert_eq!(first, second);

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }
}
