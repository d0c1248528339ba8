// Service container: string identifiers resolved to lazily-built objects

use crate::Error;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// An opaque, shareable service object.
pub type Service = Arc<dyn Any + Send + Sync>;

type ServiceFactory = Box<dyn Fn() -> Service + Send + Sync>;

enum Definition {
    Instance(Service),
    Factory(ServiceFactory),
}

/// The capability set a service locator exposes to its consumers.
///
/// Decorators implement this trait over a wrapped locator and override
/// selected behavior while delegating the rest.
pub trait ServiceLocator: Send + Sync {
    /// Whether `id` can be resolved by this locator.
    fn exists(&self, id: &str) -> bool;

    /// Resolve `id` to a service object.
    fn resolve(&self, id: &str) -> Result<Service, Error>;
}

/// The service container.
///
/// Cloning produces another handle onto the same definitions, so a service
/// registered through one handle is resolvable through all of them.
#[derive(Clone, Default)]
pub struct Container {
    definitions: Arc<RwLock<HashMap<String, Definition>>>,
    instances: Arc<RwLock<HashMap<String, Service>>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating service container");
        Self::default()
    }

    /// Register a ready-made service instance under `id`.
    pub fn register<T: Any + Send + Sync>(&self, id: impl Into<String>, instance: T) {
        self.register_service(id, Arc::new(instance));
    }

    /// Register an already-shared service object under `id`.
    ///
    /// Re-registering an id replaces its definition and drops any instance
    /// built from the previous one.
    pub fn register_service(&self, id: impl Into<String>, service: Service) {
        let id = id.into();
        trace!(service = %id, "Registering service instance");
        self.definitions
            .write()
            .unwrap()
            .insert(id.clone(), Definition::Instance(service));
        self.instances.write().unwrap().remove(&id);
        debug!(service = %id, "Service registered");
    }

    /// Register a service built lazily on first resolution.
    ///
    /// The factory runs at most once; the built instance is cached and
    /// shared by every subsequent resolution.
    pub fn register_factory<T, F>(&self, id: impl Into<String>, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let id = id.into();
        trace!(service = %id, "Registering service factory");
        self.definitions.write().unwrap().insert(
            id.clone(),
            Definition::Factory(Box::new(move || Arc::new(factory()) as Service)),
        );
        self.instances.write().unwrap().remove(&id);
        debug!(service = %id, "Service factory registered");
    }

    /// Resolve `id` and downcast to a concrete type.
    pub fn resolve_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, Error> {
        downcast_service::<T>(id, self.resolve(id)?)
    }
}

impl ServiceLocator for Container {
    fn exists(&self, id: &str) -> bool {
        self.definitions.read().unwrap().contains_key(id)
    }

    fn resolve(&self, id: &str) -> Result<Service, Error> {
        if let Some(instance) = self.instances.read().unwrap().get(id) {
            return Ok(instance.clone());
        }

        // Build under the instance write lock so a factory runs at most once
        // even when two handles race on the first resolution.
        let mut instances = self.instances.write().unwrap();
        if let Some(instance) = instances.get(id) {
            return Ok(instance.clone());
        }

        let definitions = self.definitions.read().unwrap();
        let service = match definitions.get(id) {
            Some(Definition::Instance(service)) => service.clone(),
            Some(Definition::Factory(factory)) => {
                debug!(service = %id, "Building service from factory");
                factory()
            }
            None => {
                debug!(service = %id, "Service not found in container");
                return Err(Error::ServiceNotFound(id.to_string()));
            }
        };

        instances.insert(id.to_string(), service.clone());
        trace!(service = %id, "Service resolved");
        Ok(service)
    }
}

pub(crate) fn downcast_service<T: Any + Send + Sync>(
    id: &str,
    service: Service,
) -> Result<Arc<T>, Error> {
    service.downcast::<T>().map_err(|_| {
        Error::ServiceTypeMismatch(format!(
            "service \"{}\" is not a {}",
            id,
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Mailer {
        transport: &'static str,
    }

    #[test]
    fn test_register_and_resolve_typed() {
        let container = Container::new();
        container.register("mailer", Mailer { transport: "smtp" });

        let mailer = container.resolve_as::<Mailer>("mailer").unwrap();
        assert_eq!(mailer.transport, "smtp");
        assert!(container.exists("mailer"));
        assert!(!container.exists("logger"));
    }

    #[test]
    fn test_unknown_id_fails() {
        let container = Container::new();
        let err = container.resolve("missing").unwrap_err();
        assert!(matches!(err, Error::ServiceNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_type_mismatch_fails() {
        let container = Container::new();
        container.register("mailer", Mailer { transport: "smtp" });

        let err = container.resolve_as::<String>("mailer").unwrap_err();
        assert!(matches!(err, Error::ServiceTypeMismatch(_)));
    }

    #[test]
    fn test_factory_runs_once() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        let container = Container::new();
        container.register_factory("mailer", || {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Mailer { transport: "lazy" }
        });

        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

        let first = container.resolve_as::<Mailer>("mailer").unwrap();
        let second = container.resolve_as::<Mailer>("mailer").unwrap();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reregister_replaces_cached_instance() {
        let container = Container::new();
        container.register("mailer", Mailer { transport: "smtp" });
        let _ = container.resolve("mailer").unwrap();

        container.register("mailer", Mailer { transport: "sendmail" });
        let mailer = container.resolve_as::<Mailer>("mailer").unwrap();
        assert_eq!(mailer.transport, "sendmail");
    }

    #[test]
    fn test_cloned_handles_share_definitions() {
        let container = Container::new();
        let other = container.clone();

        other.register("mailer", Mailer { transport: "smtp" });
        assert!(container.exists("mailer"));
    }
}
