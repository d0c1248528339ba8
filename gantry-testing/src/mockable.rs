// Mock-override layer for the service container

use crate::error::MockError;
use gantry_core::{Error, Service, ServiceLocator};
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, trace};

/// Shared table of mock overrides, keyed by service id.
///
/// Cloning the handle shares the underlying table. [`MockTable::global`]
/// hands out the process-wide table that [`MockableContainer::new`] uses, so
/// an override registered through one container handle is visible to every
/// other handle in the process for as long as it stays registered. Tests
/// that need isolation construct their own table and pass it to
/// [`MockableContainer::with_table`].
#[derive(Clone, Default)]
pub struct MockTable {
    entries: Arc<RwLock<HashMap<String, Service>>>,
}

impl MockTable {
    /// A fresh, private table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table.
    pub fn global() -> MockTable {
        static GLOBAL: OnceLock<MockTable> = OnceLock::new();
        GLOBAL.get_or_init(MockTable::new).clone()
    }

    /// Number of active overrides.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    fn get(&self, id: &str) -> Option<Service> {
        self.entries.read().unwrap().get(id).cloned()
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.read().unwrap().contains_key(id)
    }

    /// Insert unless the id is already present. Returns false on conflict,
    /// leaving the existing entry in place.
    fn try_insert(&self, id: &str, service: Service) -> bool {
        match self.entries.write().unwrap().entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(service);
                true
            }
        }
    }

    fn remove(&self, id: &str) {
        self.entries.write().unwrap().remove(id);
    }

    fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    fn snapshot(&self) -> HashMap<String, Service> {
        self.entries.read().unwrap().clone()
    }
}

/// Service locator decorator that lets a test substitute individual services
/// for fakes without touching the wrapped locator's own resolution logic.
///
/// While an override is active, resolving its id returns the substitute and
/// the wrapped locator is never consulted for it, so the real service's lazy
/// construction and side effects are bypassed entirely. Everything else
/// delegates, including the wrapped locator's failure behavior for unknown
/// ids.
pub struct MockableContainer {
    inner: Arc<dyn ServiceLocator>,
    mocks: MockTable,
}

impl MockableContainer {
    /// Wrap a locator, sharing the process-wide mock table.
    pub fn new(inner: Arc<dyn ServiceLocator>) -> Self {
        Self::with_table(inner, MockTable::global())
    }

    /// Wrap a locator with an explicitly provided mock table.
    pub fn with_table(inner: Arc<dyn ServiceLocator>, mocks: MockTable) -> Self {
        Self { inner, mocks }
    }

    /// Substitute `service` for whatever the wrapped locator would resolve
    /// for `id`.
    ///
    /// The id must be resolvable by the wrapped locator, and must not
    /// already carry an override; re-mocking requires an explicit
    /// [`unmock`](Self::unmock) first. Returns the substitute unchanged so
    /// the caller can hold onto it for later verification.
    pub fn mock(&self, id: &str, service: Service) -> Result<Service, MockError> {
        if !self.inner.exists(id) {
            return Err(MockError::UnknownService { id: id.to_string() });
        }

        if !self.mocks.try_insert(id, service.clone()) {
            return Err(MockError::AlreadyMocked { id: id.to_string() });
        }

        debug!(service = %id, "Service overridden with mock");
        Ok(service)
    }

    /// Wrap a concrete value and substitute it for `id`.
    pub fn mock_value<T: Any + Send + Sync>(
        &self,
        id: &str,
        value: T,
    ) -> Result<Arc<T>, MockError> {
        let service = Arc::new(value);
        self.mock(id, service.clone())?;
        Ok(service)
    }

    /// Remove the override for `id`.
    ///
    /// A no-op when no override exists, so teardown code can call it
    /// unconditionally.
    pub fn unmock(&self, id: &str) {
        trace!(service = %id, "Removing mock override");
        self.mocks.remove(id);
    }

    /// Remove every override.
    pub fn clear_mocks(&self) {
        debug!("Clearing all mock overrides");
        self.mocks.clear();
    }

    /// Whether `id` currently carries an override.
    pub fn has_mock(&self, id: &str) -> bool {
        self.mocks.contains(id)
    }

    /// Read-only snapshot of the current overrides.
    pub fn mocked_services(&self) -> HashMap<String, Service> {
        self.mocks.snapshot()
    }

    /// Resolve `id` and downcast to a concrete type.
    pub fn resolve_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, Error> {
        self.resolve(id)?.downcast::<T>().map_err(|_| {
            Error::ServiceTypeMismatch(format!(
                "service \"{}\" is not a {}",
                id,
                std::any::type_name::<T>()
            ))
        })
    }

    /// The wrapped locator.
    pub fn inner(&self) -> &Arc<dyn ServiceLocator> {
        &self.inner
    }
}

impl ServiceLocator for MockableContainer {
    fn exists(&self, id: &str) -> bool {
        self.has_mock(id) || self.inner.exists(id)
    }

    fn resolve(&self, id: &str) -> Result<Service, Error> {
        if let Some(mock) = self.mocks.get(id) {
            trace!(service = %id, "Resolving mock override");
            return Ok(mock);
        }

        self.inner.resolve(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::Container;

    #[derive(Debug)]
    struct Mailer {
        transport: &'static str,
    }

    #[derive(Debug)]
    struct Logger;

    fn container_with(ids: &[(&str, &'static str)]) -> MockableContainer {
        let services = Container::new();
        for (id, transport) in ids {
            services.register(*id, Mailer { transport });
        }
        MockableContainer::with_table(Arc::new(services), MockTable::new())
    }

    #[test]
    fn test_mock_unknown_service_is_rejected() {
        let container = container_with(&[("mailer", "smtp")]);

        let err = container
            .mock("unknown_service", Arc::new(Logger))
            .unwrap_err();
        assert_eq!(
            err,
            MockError::UnknownService {
                id: "unknown_service".into()
            }
        );
        assert!(!container.has_mock("unknown_service"));
    }

    #[test]
    fn test_mock_returns_the_substitute_unchanged() {
        let container = container_with(&[("mailer", "smtp")]);

        let substitute: Service = Arc::new(Mailer { transport: "fake" });
        let returned = container.mock("mailer", substitute.clone()).unwrap();
        assert!(Arc::ptr_eq(&returned, &substitute));

        let resolved = container.resolve("mailer").unwrap();
        assert!(Arc::ptr_eq(&resolved, &substitute));
    }

    #[test]
    fn test_duplicate_mock_is_rejected_and_first_wins() {
        let container = container_with(&[("mailer", "smtp")]);

        let first = container
            .mock_value("mailer", Mailer { transport: "first" })
            .unwrap();
        let err = container
            .mock_value("mailer", Mailer { transport: "second" })
            .unwrap_err();
        assert_eq!(
            err,
            MockError::AlreadyMocked {
                id: "mailer".into()
            }
        );

        let resolved = container.resolve_as::<Mailer>("mailer").unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));
        assert_eq!(resolved.transport, "first");
    }

    #[test]
    fn test_unmock_is_idempotent() {
        let container = container_with(&[("mailer", "smtp")]);

        container.unmock("mailer");
        container.unmock("never_mocked");
        assert!(container.mocked_services().is_empty());
    }

    #[test]
    fn test_unmock_restores_real_resolution() {
        let container = container_with(&[("mailer", "smtp")]);

        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        assert_eq!(
            container.resolve_as::<Mailer>("mailer").unwrap().transport,
            "fake"
        );

        container.unmock("mailer");
        assert_eq!(
            container.resolve_as::<Mailer>("mailer").unwrap().transport,
            "smtp"
        );
    }

    #[test]
    fn test_clear_mocks_empties_the_table() {
        let container = container_with(&[("mailer", "smtp"), ("courier", "http")]);

        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        container
            .mock_value("courier", Mailer { transport: "fake" })
            .unwrap();
        assert_eq!(container.mocked_services().len(), 2);

        container.clear_mocks();
        assert!(!container.has_mock("mailer"));
        assert!(!container.has_mock("courier"));
        assert!(container.mocked_services().is_empty());
    }

    #[test]
    fn test_exists_is_or_of_mock_and_inner() {
        let container = container_with(&[("mailer", "smtp")]);

        assert!(container.exists("mailer"));
        assert!(!container.exists("unknown_service"));

        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        assert!(container.exists("mailer"));
        assert!(container.has_mock("mailer"));
    }

    #[test]
    fn test_has_mock_is_independent_of_inner() {
        let container = container_with(&[("mailer", "smtp")]);
        assert!(!container.has_mock("mailer"));

        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        assert!(container.has_mock("mailer"));
    }

    #[test]
    fn test_unknown_id_propagates_inner_failure() {
        let container = container_with(&[("mailer", "smtp")]);

        let err = container.resolve("unknown_service").unwrap_err();
        assert!(matches!(err, Error::ServiceNotFound(id) if id == "unknown_service"));
    }

    #[test]
    fn test_mock_bypasses_lazy_construction() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        let services = Container::new();
        services.register_factory("mailer", || {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Mailer { transport: "real" }
        });
        let container = MockableContainer::with_table(Arc::new(services), MockTable::new());

        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        let resolved = container.resolve_as::<Mailer>("mailer").unwrap();

        assert_eq!(resolved.transport, "fake");
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_overrides_are_shared_across_handles() {
        let services = Arc::new(Container::new());
        services.register("mailer", Mailer { transport: "smtp" });

        let table = MockTable::new();
        let first = MockableContainer::with_table(services.clone(), table.clone());
        let second = MockableContainer::with_table(services, table);

        first
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();

        assert!(second.has_mock("mailer"));
        assert_eq!(
            second.resolve_as::<Mailer>("mailer").unwrap().transport,
            "fake"
        );

        second.unmock("mailer");
        assert!(!first.has_mock("mailer"));
    }

    #[test]
    fn test_global_table_is_shared_between_containers() {
        let services = Arc::new(Container::new());
        services.register("global_sharing_probe", Mailer { transport: "smtp" });

        let first = MockableContainer::new(services.clone());
        let second = MockableContainer::new(services);

        first
            .mock_value("global_sharing_probe", Mailer { transport: "fake" })
            .unwrap();
        assert!(second.has_mock("global_sharing_probe"));

        second.unmock("global_sharing_probe");
        assert!(!first.has_mock("global_sharing_probe"));
    }

    #[test]
    fn test_snapshot_is_detached_from_the_table() {
        let container = container_with(&[("mailer", "smtp")]);
        container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();

        let mut snapshot = container.mocked_services();
        snapshot.clear();

        assert!(container.has_mock("mailer"));
    }

    #[test]
    fn test_mailer_logger_scenario() {
        let services = Container::new();
        services.register("mailer", Mailer { transport: "smtp" });
        services.register("logger", Logger);
        let container = MockableContainer::with_table(Arc::new(services), MockTable::new());

        let fake = container
            .mock_value("mailer", Mailer { transport: "fake" })
            .unwrap();
        let resolved = container.resolve_as::<Mailer>("mailer").unwrap();
        assert!(Arc::ptr_eq(&resolved, &fake));

        let err = container
            .mock_value("mailer", Mailer { transport: "other" })
            .unwrap_err();
        assert_eq!(
            err,
            MockError::AlreadyMocked {
                id: "mailer".into()
            }
        );

        container.unmock("mailer");
        assert_eq!(
            container.resolve_as::<Mailer>("mailer").unwrap().transport,
            "smtp"
        );

        let err = container.mock_value("unknown_service", Logger).unwrap_err();
        assert_eq!(
            err,
            MockError::UnknownService {
                id: "unknown_service".into()
            }
        );
    }
}
