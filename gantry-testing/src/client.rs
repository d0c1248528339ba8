// In-process HTTP test client

use gantry_core::{Error, HttpRequest, HttpResponse, RequestHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Drives requests through an application's handler seam, without opening a
/// socket.
pub struct TestClient {
    handler: Arc<dyn RequestHandler>,
    default_headers: HashMap<String, String>,
}

impl TestClient {
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self {
            handler,
            default_headers: HashMap::new(),
        }
    }

    /// Attach a header to every request this client sends.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, &[], None).await
    }

    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request("POST", path, &[], Some(body)).await
    }

    /// POST a JSON-encoded body with the matching content type.
    pub async fn post_json<T: Serialize>(&self, path: &str, value: &T) -> TestResponse {
        let body = match serde_json::to_vec(value) {
            Ok(body) => body,
            Err(e) => return TestResponse::Failed(Error::Serialization(e.to_string())),
        };
        self.request(
            "POST",
            path,
            &[("Content-Type", "application/json")],
            Some(body),
        )
        .await
    }

    pub async fn put(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request("PUT", path, &[], Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request("PATCH", path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, &[], None).await
    }

    /// Make a request with an explicit method, headers and body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let mut request = HttpRequest::new(method, path);
        for (key, value) in &self.default_headers {
            request.headers.insert(key.clone(), value.clone());
        }
        for (key, value) in headers {
            request
                .headers
                .insert((*key).to_string(), (*value).to_string());
        }
        request.body = body.unwrap_or_default();

        match self.handler.handle(request).await {
            Ok(response) => TestResponse::Response(response),
            Err(error) => TestResponse::Failed(error),
        }
    }
}

/// Outcome of a test request.
#[derive(Debug)]
pub enum TestResponse {
    Response(HttpResponse),
    Failed(Error),
}

impl TestResponse {
    /// The response, panicking when the handler failed instead.
    pub fn expect_response(&self) -> &HttpResponse {
        match self {
            TestResponse::Response(response) => response,
            TestResponse::Failed(error) => {
                panic!("expected a response, handler failed: {error}")
            }
        }
    }

    /// The handler error, panicking when a response came back instead.
    pub fn expect_error(&self) -> &Error {
        match self {
            TestResponse::Failed(error) => error,
            TestResponse::Response(response) => {
                panic!("expected a handler error, got response {}", response.status)
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TestResponse::Response(response) => Some(response.status),
            TestResponse::Failed(_) => None,
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        match self {
            TestResponse::Response(response) => response.header(key),
            TestResponse::Failed(_) => None,
        }
    }

    pub fn body_string(&self) -> Option<String> {
        match self {
            TestResponse::Response(response) => Some(response.body_string()),
            TestResponse::Failed(_) => None,
        }
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        match self {
            TestResponse::Response(response) => serde_json::from_slice(&response.body)
                .map_err(|e| Error::Deserialization(e.to_string())),
            TestResponse::Failed(error) => {
                Err(Error::Internal(format!("handler failed: {error}")))
            }
        }
    }
}
