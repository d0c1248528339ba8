//! Functional-test support for Gantry applications.
//!
//! This facade re-exports the two member crates; most test suites depend on
//! it alone. See [`gantry_testing`] for the helpers themselves and
//! [`gantry_core`] for the framework surface they consume.

pub use gantry_core;
pub use gantry_testing;

// Flat re-exports for the common path
pub use gantry_core::{
    Container, Error, HttpRequest, HttpResponse, RequestHandler, Service, ServiceLocator,
};
pub use gantry_testing::{
    assert_response_code, assert_response_forbidden, assert_response_not_found,
    assert_response_ok, assert_response_redirect, reporter_from_env, tests_debug, FixtureError,
    MockError, MockTable, MockableContainer, TapReporter, TestApp, TestAppBuilder, TestClient,
    TestListener, TestResponse, VerboseReporter,
};
