//! HTTP execution abstraction for testing.
//!
//! Everything above this module talks to the network through [`HttpExecutor`],
//! so tests can swap in scripted responses without a server.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use url::Url;

use crate::error::Error;
use crate::types::{HttpRequest, HttpResponse};

/// Trait for executing HTTP requests.
///
/// Futures are not required to be `Send`: the store drives them from a
/// single-threaded event loop.
#[async_trait(?Send)]
pub trait HttpExecutor {
    /// Execute an HTTP request and return the response.
    ///
    /// Returns `Err` with a message if no response was received. Non-2xx
    /// responses are returned as `Ok`.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Production HTTP executor using reqwest.
pub struct ReqwestExecutor {
    client: Client,
    base_url: Url,
}

impl ReqwestExecutor {
    /// Create a new executor for `base_url` with the given timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout(base_url: &str) -> Result<Self, Error> {
        Self::new(base_url, Duration::from_secs(30))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            self.base_url.join(path.trim_start_matches('/'))
        }
    }
}

#[async_trait(?Send)]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let method: http::Method = request.method.into();
        let url = self.resolve(&request.path).map_err(|e| e.to_string())?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str()).map_err(|e| e.to_string())?;
            let header_value = HeaderValue::try_from(value.as_str()).map_err(|e| e.to_string())?;
            headers.insert(header_name, header_value);
        }

        let mut req_builder = self.client.request(method, url).headers(headers);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await.map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.to_string(), v.to_string());
            }
        }

        let body_text = response.text().await.map_err(|e| e.to_string())?;
        let body = serde_json::from_str(&body_text).unwrap_or(serde_json::Value::Null);

        Ok(HttpResponse {
            status,
            status_text,
            headers: resp_headers,
            body,
            body_text: Some(body_text),
        })
    }
}

/// Scripted HTTP executor for tests.
///
/// Responses are keyed by [`HttpRequest::key`], e.g. `"GET /api/users/"`.
/// Several responses queued under one key are served in order; the last one
/// keeps answering. A [`Gate`] holds the next matching request until it is
/// released, which lets tests settle concurrent requests in any order.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    type Scripted = Result<HttpResponse, String>;

    #[derive(Clone, Default)]
    pub struct MockExecutor {
        responses: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
        default_response: Arc<Mutex<Option<HttpResponse>>>,
        recorded_requests: Arc<Mutex<Vec<HttpRequest>>>,
        gates: Arc<Mutex<HashMap<String, VecDeque<Arc<Notify>>>>>,
    }

    /// Releases one held request.
    #[derive(Clone)]
    pub struct Gate {
        notify: Arc<Notify>,
    }

    impl Gate {
        pub fn release(&self) {
            self.notify.notify_one();
        }
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for a request key.
        pub fn with_response(self, key: impl Into<String>, response: HttpResponse) -> Self {
            self.push(key.into(), Ok(response));
            self
        }

        /// Queue a JSON response for a request key.
        pub fn with_json(self, key: impl Into<String>, status: u16, body: serde_json::Value) -> Self {
            self.with_response(key, Self::json_response(status, body))
        }

        /// Queue a transport failure for a request key.
        pub fn with_failure(self, key: impl Into<String>, message: impl Into<String>) -> Self {
            self.push(key.into(), Err(message.into()));
            self
        }

        pub fn with_default_response(self, response: HttpResponse) -> Self {
            *self.default_response.lock().unwrap() = Some(response);
            self
        }

        /// Queue a response on a shared executor.
        pub fn respond(&self, key: impl Into<String>, status: u16, body: serde_json::Value) {
            self.push(key.into(), Ok(Self::json_response(status, body)));
        }

        /// Hold the next request matching `key` until the gate is released.
        pub fn hold(&self, key: impl Into<String>) -> Gate {
            let notify = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .entry(key.into())
                .or_default()
                .push_back(notify.clone());
            Gate { notify }
        }

        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Number of recorded requests with the given key.
        pub fn count(&self, key: &str) -> usize {
            self.recorded_requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.key() == key)
                .count()
        }

        pub fn clear_recorded(&self) {
            self.recorded_requests.lock().unwrap().clear();
        }

        pub fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
            let body_text = body.to_string();
            HttpResponse {
                status,
                status_text: String::new(),
                headers: HashMap::new(),
                body,
                body_text: Some(body_text),
            }
        }

        pub fn no_content() -> HttpResponse {
            HttpResponse {
                status: 204,
                status_text: "No Content".to_string(),
                headers: HashMap::new(),
                body: serde_json::Value::Null,
                body_text: Some(String::new()),
            }
        }

        pub fn not_found() -> HttpResponse {
            Self::json_response(404, serde_json::json!({"detail": "Not found."}))
        }

        fn push(&self, key: String, scripted: Scripted) {
            self.responses
                .lock()
                .unwrap()
                .entry(key)
                .or_default()
                .push_back(scripted);
        }

        fn next_response(&self, key: &str) -> Scripted {
            let mut responses = self.responses.lock().unwrap();
            if let Some(queue) = responses.get_mut(key) {
                if queue.len() > 1 {
                    if let Some(scripted) = queue.pop_front() {
                        return scripted;
                    }
                }
                if let Some(scripted) = queue.front() {
                    return scripted.clone();
                }
            }

            if let Some(ref response) = *self.default_response.lock().unwrap() {
                return Ok(response.clone());
            }

            Ok(Self::not_found())
        }
    }

    #[async_trait(?Send)]
    impl HttpExecutor for MockExecutor {
        async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
            let key = request.key();
            self.recorded_requests.lock().unwrap().push(request.clone());

            let gate = self
                .gates
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(|queue| queue.pop_front());
            if let Some(notify) = gate {
                notify.notified().await;
            }

            self.next_response(&key)
        }
    }
}
