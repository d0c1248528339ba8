// Database fixture loading for functional tests

use crate::error::FixtureError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// A predefined set of database rows a test depends on.
///
/// Implementors hold whatever connection handle they need; `load` inserts
/// the rows.
#[async_trait]
pub trait Fixture: Send + Sync {
    async fn load(&self) -> Result<(), FixtureError>;
}

/// Empties the tables under test.
#[async_trait]
pub trait TablePurger: Send + Sync {
    async fn purge(&self) -> Result<(), FixtureError>;
}

/// Drives fixtures against a purger.
///
/// Two modes: [`reload`](Self::reload) purges before loading, so the test
/// starts from exactly the fixture data; [`append`](Self::append) loads on
/// top of whatever rows already exist.
pub struct FixtureExecutor {
    purger: Arc<dyn TablePurger>,
}

impl FixtureExecutor {
    pub fn new(purger: Arc<dyn TablePurger>) -> Self {
        Self { purger }
    }

    /// Purge, then load every fixture in order.
    pub async fn reload(&self, fixtures: &[Arc<dyn Fixture>]) -> Result<(), FixtureError> {
        debug!(count = fixtures.len(), "Reloading fixtures after purge");
        self.purger.purge().await?;
        self.load_all(fixtures).await
    }

    /// Load every fixture in order, keeping existing rows.
    pub async fn append(&self, fixtures: &[Arc<dyn Fixture>]) -> Result<(), FixtureError> {
        debug!(count = fixtures.len(), "Appending fixtures");
        self.load_all(fixtures).await
    }

    /// Purge without loading anything.
    pub async fn purge(&self) -> Result<(), FixtureError> {
        self.purger.purge().await
    }

    async fn load_all(&self, fixtures: &[Arc<dyn Fixture>]) -> Result<(), FixtureError> {
        for fixture in fixtures {
            fixture.load().await?;
        }
        Ok(())
    }
}

/// Runs a test body between fixture setup and an unconditional purge.
pub struct FixtureHarness {
    executor: FixtureExecutor,
    fixtures: Vec<Arc<dyn Fixture>>,
    auto_purge: bool,
}

impl FixtureHarness {
    pub fn new(purger: Arc<dyn TablePurger>) -> Self {
        Self {
            executor: FixtureExecutor::new(purger),
            fixtures: Vec::new(),
            auto_purge: true,
        }
    }

    pub fn with_fixture(mut self, fixture: Arc<dyn Fixture>) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Leave rows in place after the test body finishes.
    pub fn without_auto_purge(mut self) -> Self {
        self.auto_purge = false;
        self
    }

    /// Reload the fixtures, run the body, purge afterwards.
    ///
    /// The purge happens even when the body fails; its own failure is logged
    /// rather than masking the body's result.
    pub async fn run<F, Fut>(&self, body: F) -> Result<(), FixtureError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(), FixtureError>>,
    {
        self.executor.reload(&self.fixtures).await?;

        let result = body().await;

        if self.auto_purge {
            if let Err(e) = self.executor.purge().await {
                warn!(error = %e, "Post-test purge failed");
            }
        }

        result
    }
}
