//! Testing utilities for Gantry applications.
//!
//! This crate carries the helpers a functional-test suite needs: a
//! mock-aware service container, test-run reporters (verbose and TAP),
//! HTTP response assertions, database fixture plumbing and an in-process
//! test client.
//!
//! ## Features
//!
//! - **MockableContainer** - swap individual services for fakes, per test
//! - **TestApp / TestAppBuilder** - wire services and routes into an app
//! - **TestClient** - drive the app without opening a socket
//! - **Assertions** - response status checks with readable failure output
//! - **Reporters** - verbose console printer or TAP, chosen from the env
//! - **Fixtures** - purge-then-load and append-mode database seeding
//!
//! ## Quick start
//!
//! ```
//! use gantry_testing::*;
//! use gantry_core::HttpResponse;
//!
//! # tokio_test::block_on(async {
//! let app = TestAppBuilder::new()
//!     .with_mock_table(MockTable::new())
//!     .with_service("greeting", String::from("hello"))
//!     .with_route("GET", "/hello", |_request, container| async move {
//!         let greeting = container.resolve_as::<String>("greeting")?;
//!         Ok(HttpResponse::text(greeting.as_str()))
//!     })
//!     .build();
//!
//! let client = app.client();
//! let response = client.get("/hello").await;
//! assert_eq!(response.status(), Some(200));
//! assert_eq!(response.body_string().as_deref(), Some("hello"));
//! # });
//! ```
//!
//! ## Mocking a service
//!
//! ```
//! use gantry_testing::{MockTable, MockableContainer};
//! use gantry_core::Container;
//! use std::sync::Arc;
//!
//! let services = Container::new();
//! services.register("mailer", String::from("real mailer"));
//!
//! let container = MockableContainer::with_table(Arc::new(services), MockTable::new());
//!
//! let fake = container
//!     .mock_value("mailer", String::from("fake mailer"))
//!     .unwrap();
//! let resolved = container.resolve_as::<String>("mailer").unwrap();
//! assert!(Arc::ptr_eq(&fake, &resolved));
//!
//! container.unmock("mailer");
//! let real = container.resolve_as::<String>("mailer").unwrap();
//! assert_eq!(real.as_str(), "real mailer");
//! ```
//!
//! ## Response assertions
//!
//! ```
//! use gantry_testing::assert_response_ok;
//! use gantry_core::HttpResponse;
//!
//! let response = HttpResponse::ok().with_body(b"all good".to_vec());
//! assert_response_ok(&response);
//! ```

mod app;
mod assertions;
mod client;
mod error;
mod fixtures;
mod mockable;
mod reporter;
mod tap;

pub use app::{RouteTable, TestApp, TestAppBuilder};
pub use assertions::{
    assert_response_code, assert_response_code_with, assert_response_forbidden,
    assert_response_forbidden_with, assert_response_not_found, assert_response_not_found_with,
    assert_response_ok, assert_response_ok_with, assert_response_redirect,
    assert_response_redirect_with, guess_error_message,
};
pub use client::{TestClient, TestResponse};
pub use error::{FixtureError, MockError};
pub use fixtures::{Fixture, FixtureExecutor, FixtureHarness, TablePurger};
pub use mockable::{MockTable, MockableContainer};
pub use reporter::{
    reporter_from_env, tests_debug, FailureDetail, RunSummary, TestListener, VerboseReporter,
};
pub use tap::TapReporter;
