//! HTTP front end: `POST /invoke` and `GET /health`

use std::sync::Arc;

use axum::{
  extract::State,
  http::{HeaderName, HeaderValue, StatusCode},
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::adapter::Adapter;
use crate::error::Error;
use crate::request::{InvocationEvent, InvocationResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse
{   pub status: String
}

pub fn create_router(adapter: Arc<Adapter>) -> Router
{   Router::new()
      .route("/health", get(health))
      .route("/invoke", post(invoke))
      .with_state(adapter)
}

/// Bind `0.0.0.0:{port}` and serve until the process stops
pub async fn serve(adapter: Arc<Adapter>, port: u16)
  -> Result<(), Error>
{   let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
      .await
      .map_err(|e| Error::InvalidConfiguration(
        format!("cannot bind port {}: {}", port, e)
      ))?;
    info!("Server running on port {}", port);

    axum::serve(listener, create_router(adapter))
      .await
      .map_err(|e| Error::Failure(format!("server error: {}", e)))
}

async fn health() -> Json<HealthResponse>
{   Json(HealthResponse { status: "healthy".to_string() })
}

async fn invoke(
  State(adapter): State<Arc<Adapter>>
, body: String
) -> Response
{   debug!("POST /invoke ({} bytes)", body.len());
    let reply = adapter
      .handle_event(InvocationEvent::with_body(body))
      .await;
    into_http(reply)
}

/// Turn an invocation response into an HTTP response
pub fn into_http(reply: InvocationResponse) -> Response
{   let status = StatusCode::from_u16(reply.status_code)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, reply.body).into_response();
    for (name, value) in &reply.headers
    {   if let (Ok(name), Ok(value)) = (
          HeaderName::from_bytes(name.as_bytes()),
          HeaderValue::from_str(value)
        )
        {   response.headers_mut().insert(name, value);
        }
    }
    response
}
