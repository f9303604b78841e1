//! Transport seam between the accessor and the remote REST API.
//!
//! The accessor never talks to the network directly; everything goes
//! through the `Transport` trait, which keeps the cache logic testable
//! and the HTTP details swappable. Retry and timeout policy live here,
//! not in the accessor.

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::TransportError;
use crate::query::Query;

/// Fetches a raw JSON envelope for an endpoint path + query.
pub trait Transport: Send + Sync {
  fn get<'a>(
    &'a self,
    path: &'a str,
    query: &'a Query,
  ) -> BoxFuture<'a, Result<Value, TransportError>>;
}

/// HTTP transport backed by reqwest.
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: String,
}

impl HttpTransport {
  pub fn new(config: &Config) -> Result<Self, TransportError> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(token) = Config::api_token() {
      let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| TransportError::Other(format!("invalid API token: {}", e)))?;
      value.set_sensitive(true);
      headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(secs) = config.api.timeout_secs {
      builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = builder.build()?;

    Ok(Self {
      client,
      base_url: config.api.url.trim_end_matches('/').to_string(),
    })
  }

  fn url_for(&self, path: &str, query: &Query) -> String {
    let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
    if !query.is_empty() {
      url.push('?');
      url.push_str(&query.encode());
    }
    url
  }
}

impl Transport for HttpTransport {
  fn get<'a>(
    &'a self,
    path: &'a str,
    query: &'a Query,
  ) -> BoxFuture<'a, Result<Value, TransportError>> {
    Box::pin(async move {
      let url = self.url_for(path, query);
      debug!(%url, "GET");

      let response = self.client.get(&url).send().await?;
      let status = response.status();
      if !status.is_success() {
        return Err(TransportError::Status {
          status: status.as_u16(),
          url,
        });
      }

      response
        .json()
        .await
        .map_err(|e| TransportError::Body(e.to_string()))
    })
  }
}

/// Scripted transport for tests: canned responses in FIFO order, with a
/// record of every requested path.
#[cfg(test)]
pub(crate) mod mock {
  use std::collections::VecDeque;
  use std::sync::Mutex;

  use super::*;

  pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<String>>,
  }

  impl MockTransport {
    pub fn new() -> Self {
      Self {
        responses: Mutex::new(VecDeque::new()),
        requests: Mutex::new(Vec::new()),
      }
    }

    pub fn push(&self, response: Value) {
      self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, message: &str) {
      self
        .responses
        .lock()
        .unwrap()
        .push_back(Err(TransportError::Other(message.to_string())));
    }

    /// Paths requested so far, query string included.
    pub fn requested_paths(&self) -> Vec<String> {
      self.requests.lock().unwrap().clone()
    }
  }

  impl Transport for MockTransport {
    fn get<'a>(
      &'a self,
      path: &'a str,
      query: &'a Query,
    ) -> BoxFuture<'a, Result<Value, TransportError>> {
      let mut full = path.to_string();
      if !query.is_empty() {
        full.push('?');
        full.push_str(&query.encode());
      }
      self.requests.lock().unwrap().push(full);

      let next = self.responses.lock().unwrap().pop_front();
      Box::pin(async move {
        next.unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_string())))
      })
    }
  }
}
