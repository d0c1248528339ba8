// The seam between the test layer and an application under test

use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;

/// An application entry point that can service HTTP requests.
///
/// The framework kernel implements this for real applications; the testing
/// crate drives it directly, without opening a socket.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle an HTTP request and return a response
    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}
