// Core surface of the Gantry HTTP framework.
// This crate carries the pieces the functional-test layer consumes: the
// service container, HTTP types, the request-handler seam and logging.

pub mod container;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use container::{Container, Service, ServiceLocator};
pub use error::Error;
pub use handler::RequestHandler;
pub use http::{HttpRequest, HttpResponse};
pub use logging::{LogConfig, LogFormat, LogLevel};
