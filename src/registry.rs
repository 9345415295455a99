// Service registry with transient, singleton, and alias bindings

use crate::logging::{debug, trace};
use crate::Error;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A resolved service instance, shared and type-erased.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// A factory producing a service instance. Factories receive the registry
/// itself so a service can resolve the services it depends on.
pub type ServiceFactory = Arc<dyn Fn(&ServiceRegistry) -> ServiceInstance + Send + Sync>;

/// How a logical service name is produced.
enum Binding {
    /// Factory invoked on every resolution
    Transient(ServiceFactory),
    /// Factory invoked at most once; result cached for the registry's lifetime
    Singleton {
        factory: ServiceFactory,
        cell: OnceLock<ServiceInstance>,
    },
    /// Pure redirect to another name
    Alias(String),
}

/// Maps logical service names to production strategies.
///
/// Populated once during boot (registration takes `&mut self`); afterwards
/// shared read-only across requests. The only post-boot mutation is singleton
/// materialization, which the per-binding `OnceLock` makes safe under
/// concurrent first-time resolution.
///
/// The first registration for a name wins: re-registering an existing name,
/// with any binding kind, is a no-op.
#[derive(Default)]
pub struct ServiceRegistry {
    bindings: HashMap<String, Binding>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        debug!("Creating new service registry");
        Self::default()
    }

    /// Register a transient binding: the factory runs on every resolution.
    pub fn transient<T, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |registry| {
            let instance: ServiceInstance = Arc::new(factory(registry));
            instance
        });
        self.insert(name, Binding::Transient(factory));
        self
    }

    /// Register a singleton binding: the factory runs at most once.
    pub fn singleton<T, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceRegistry) -> T + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |registry| {
            let instance: ServiceInstance = Arc::new(factory(registry));
            instance
        });
        self.insert(
            name,
            Binding::Singleton {
                factory,
                cell: OnceLock::new(),
            },
        );
        self
    }

    /// Register an alias redirecting `name` to `target`.
    pub fn alias(&mut self, name: &str, target: &str) -> &mut Self {
        self.insert(name, Binding::Alias(target.to_string()));
        self
    }

    fn insert(&mut self, name: &str, binding: Binding) {
        if self.bindings.contains_key(name) {
            debug!(service = name, "Name already bound, ignoring registration");
            return;
        }
        trace!(service = name, "Registering service binding");
        self.bindings.insert(name.to_string(), binding);
    }

    /// Check if a name is bound (directly or as an alias)
    pub fn has(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Resolve a service instance by name.
    ///
    /// Aliases are followed until a concrete binding is reached; a cycle in
    /// the alias chain is reported rather than looped on. Unknown names fail
    /// with [`Error::ServiceNotFound`]; nothing is mutated on failure.
    pub fn resolve(&self, name: &str) -> Result<ServiceInstance, Error> {
        trace!(service = name, "Attempting to resolve service");
        let mut key = name;
        let mut hops = 0usize;

        loop {
            match self.bindings.get(key) {
                Some(Binding::Alias(target)) => {
                    hops += 1;
                    if hops > self.bindings.len() {
                        return Err(Error::Internal(format!(
                            "alias cycle while resolving `{name}`"
                        )));
                    }
                    trace!(service = key, target = %target, "Following alias");
                    key = target;
                }
                Some(Binding::Transient(factory)) => {
                    debug!(service = key, "Producing transient instance");
                    return Ok(factory(self));
                }
                Some(Binding::Singleton { factory, cell }) => {
                    let instance = cell.get_or_init(|| {
                        debug!(service = key, "Materializing singleton");
                        factory(self)
                    });
                    return Ok(instance.clone());
                }
                None => {
                    debug!(service = key, "Service not found in registry");
                    return Err(Error::ServiceNotFound(key.to_string()));
                }
            }
        }
    }

    /// Resolve a service and downcast it to a concrete type.
    pub fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.resolve(name)?.downcast::<T>().map_err(|_| {
            Error::Internal(format!(
                "service `{name}` is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }
}
