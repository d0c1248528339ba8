// Functional-test application harness

use crate::client::TestClient;
use crate::mockable::{MockTable, MockableContainer};
use async_trait::async_trait;
use gantry_core::{Container, Error, HttpRequest, HttpResponse, RequestHandler, ServiceLocator};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

type BoxFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;
type BoxedHandler = Box<dyn Fn(HttpRequest) -> BoxFuture + Send + Sync>;
type ContainerHandler = Box<dyn Fn(HttpRequest, Arc<MockableContainer>) -> BoxFuture + Send + Sync>;

/// Exact-match routing table standing in for the framework router in tests.
///
/// Routes are keyed by upper-cased method and literal path; unmatched
/// requests fail the way the real router does.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<(String, String), BoxedHandler>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `path`.
    pub fn insert<F, Fut>(&mut self, method: &str, path: &str, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.insert_boxed(
            method,
            path,
            Box::new(move |request| Box::pin(handler(request))),
        );
    }

    fn insert_boxed(&mut self, method: &str, path: &str, handler: BoxedHandler) {
        self.routes
            .insert((method.to_uppercase(), path.to_string()), handler);
    }
}

#[async_trait]
impl RequestHandler for RouteTable {
    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let key = (request.method.to_uppercase(), request.path.clone());
        match self.routes.get(&key) {
            Some(handler) => handler(request).await,
            None => Err(Error::RouteNotFound(format!("{} {}", key.0, key.1))),
        }
    }
}

/// A bootstrapped application under test.
///
/// Holds the mock-aware container and the handler the clients drive. Every
/// client handed out shares both, so a mock registered mid-test affects the
/// next request.
pub struct TestApp {
    run_id: Uuid,
    container: Arc<MockableContainer>,
    handler: Arc<dyn RequestHandler>,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::new()
    }

    /// A client driving this app's handler.
    pub fn client(&self) -> TestClient {
        TestClient::new(self.handler.clone())
    }

    /// The mock-aware container backing the app.
    pub fn container(&self) -> &MockableContainer {
        &self.container
    }

    /// Identifier for this app instance, attached to its log events.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

/// Builder for test applications.
pub struct TestAppBuilder {
    services: Container,
    mock_table: Option<MockTable>,
    routes: Vec<(String, String, ContainerHandler)>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            services: Container::new(),
            mock_table: None,
            routes: Vec::new(),
        }
    }

    /// Register a ready service instance.
    pub fn with_service<T: Any + Send + Sync>(self, id: &str, instance: T) -> Self {
        self.services.register(id, instance);
        self
    }

    /// Register a service built lazily on first resolution.
    pub fn with_service_factory<T, F>(self, id: &str, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.services.register_factory(id, factory);
        self
    }

    /// Use an explicit mock table instead of the process-wide one.
    pub fn with_mock_table(mut self, table: MockTable) -> Self {
        self.mock_table = Some(table);
        self
    }

    /// Register a route handler. The handler receives the request and the
    /// app's container.
    pub fn with_route<F, Fut>(mut self, method: &str, path: &str, handler: F) -> Self
    where
        F: Fn(HttpRequest, Arc<MockableContainer>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.routes.push((
            method.to_string(),
            path.to_string(),
            Box::new(move |request, container| Box::pin(handler(request, container))),
        ));
        self
    }

    /// Wire the container and routes into a runnable test application.
    pub fn build(self) -> TestApp {
        let inner: Arc<dyn ServiceLocator> = Arc::new(self.services);
        let container = Arc::new(match self.mock_table {
            Some(table) => MockableContainer::with_table(inner, table),
            None => MockableContainer::new(inner),
        });

        let mut table = RouteTable::new();
        for (method, path, handler) in self.routes {
            let container = container.clone();
            table.insert_boxed(
                &method,
                &path,
                Box::new(move |request| handler(request, container.clone())),
            );
        }

        let run_id = Uuid::new_v4();
        debug!(run = %run_id, "Test application built");

        TestApp {
            run_id,
            container,
            handler: Arc::new(table),
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
