// Errors raised by the test-support layer

use thiserror::Error;

/// Failures from the mock-override layer.
///
/// Both kinds signal a test-authoring mistake and are surfaced immediately;
/// there is nothing to retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MockError {
    /// The wrapped locator does not know the service id.
    #[error("cannot mock unknown service \"{id}\"")]
    UnknownService { id: String },

    /// The service id already carries an override.
    #[error("service \"{id}\" is already mocked")]
    AlreadyMocked { id: String },
}

/// Failures from fixture loading and purging.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("purge failed: {0}")]
    Purge(String),

    #[error("fixture load failed: {0}")]
    Load(String),

    #[error("setup failed: {0}")]
    Setup(String),
}
