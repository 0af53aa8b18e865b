//! HTTP client for the Paystack API

use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::redact::redact_sensitive;
use crate::types::PaystackResponse;

/// Client for the Paystack REST API
pub struct PaystackClient {
    http: Client,
    config: ClientConfig,
}

impl PaystackClient {
    /// Create a new client; fails when the secret key is empty
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET with query parameters
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ClientResult<PaystackResponse> {
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.send(Method::GET, path, &query, None).await
    }

    /// POST a JSON body
    pub async fn post(&self, path: &str, data: Value) -> ClientResult<PaystackResponse> {
        self.send(Method::POST, path, &[], Some(data)).await
    }

    /// Issue a request with a method name as given by a caller.
    ///
    /// For POST/PUT/PATCH `data` becomes the JSON body; for other methods an
    /// object `data` is sent as query parameters.
    pub async fn make_request(
        &self,
        method: &str,
        path: &str,
        data: Option<Value>,
    ) -> ClientResult<PaystackResponse> {
        let method = Method::from_bytes(method.trim().to_uppercase().as_bytes())
            .map_err(|_| ClientError::InvalidMethod(method.to_string()))?;

        if has_body(&method) {
            self.send(method, path, &[], data).await
        } else {
            let query = data.as_ref().map(query_pairs).unwrap_or_default();
            self.send(method, path, &query, None).await
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        data: Option<Value>,
    ) -> ClientResult<PaystackResponse> {
        let url = self.url(path);

        debug!(
            "API Request {}",
            redact_sensitive(&json!({
                "method": method.as_str(),
                "url": url,
                "query": query,
                "data": data,
            }))
        );

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.config.secret_key)
            .header(reqwest::header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(data) = data.filter(|_| has_body(&method)) {
            request = request.json(&data);
        }

        let response = request.send().await.map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let result = Self::interpret_response(status.as_u16(), &text);
        match &result {
            Ok(body) => debug!(
                "API Response {}",
                redact_sensitive(&json!({
                    "method": method.as_str(),
                    "url": url,
                    "status": status.as_u16(),
                    "data": body.data,
                }))
            ),
            Err(e) => error!("{} {} failed: {}", method, url, e),
        }

        result
    }

    /// Turn a raw upstream reply into a response envelope.
    ///
    /// Any JSON body is returned, including Paystack's own error envelopes;
    /// only non-JSON bodies are errors.
    pub fn interpret_response(status: u16, text: &str) -> ClientResult<PaystackResponse> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Ok(PaystackResponse::from_json(
                value,
                (200..300).contains(&status),
            )),
            Err(_) => Err(ClientError::non_json(status, text)),
        }
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            ClientError::HttpError(e)
        }
    }
}

fn has_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Flatten an object into query pairs; strings are sent unquoted
fn query_pairs(data: &Value) -> Vec<(String, String)> {
    data.as_object()
        .map(|map| {
            map.iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}
