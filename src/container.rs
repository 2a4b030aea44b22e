//! # Service Container Module
//!
//! A typemap registry shared services are resolved from during argument
//! binding, keyed by `TypeId`.
//!
//! ## Overview
//!
//! The container holds one instance per concrete type:
//!
//! - **Services** registered with [`Container::register`] are resolved into
//!   handler parameters declared via `ParamSpec::service::<T>(..)`.
//! - **Components** registered with [`Container::register_component`] double
//!   as services and as handler providers: a route registered against a
//!   component type is resolved to one of the component's named actions once,
//!   at registration time.
//!
//! Registration happens during startup wiring (`&mut` access); lookups during
//! dispatch are `&self` and lock-free.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut container = Container::new();
//! container.register(PgPool::connect(url)?);
//! container.register_component(PetController::new());
//!
//! let mut app = Dispatcher::with_services(container, store);
//! app.get("/pets/{id}", Handler::component::<PetController>("show"))?;
//! ```

use crate::binding::Action;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A container-held type that exposes named handler actions.
///
/// Implementors map action names to [`Action`]s; the dispatcher calls
/// [`Component::action`] once per registered route, so an unknown name is a
/// startup error rather than a request-time failure.
pub trait Component: Send + Sync + 'static {
    /// Build the action registered under `name`, or `None` if the component
    /// has no such action.
    fn action(self: Arc<Self>, name: &str) -> Option<Action>;
}

struct ServiceEntry {
    service: Arc<dyn Any + Send + Sync>,
    component: Option<Arc<dyn Component>>,
    type_name: &'static str,
}

/// Typemap of shared service instances.
#[derive(Default)]
pub struct Container {
    entries: HashMap<TypeId, ServiceEntry>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance, replacing any previous instance of the
    /// same type.
    pub fn register<T: Any + Send + Sync>(&mut self, service: T) {
        self.register_arc(Arc::new(service));
    }

    /// Register an already-shared service instance. Useful when the caller
    /// keeps a handle to the same instance.
    pub fn register_arc<T: Any + Send + Sync>(&mut self, service: Arc<T>) {
        let type_name = std::any::type_name::<T>();
        debug!(service = type_name, "Service registered");
        self.entries.insert(
            TypeId::of::<T>(),
            ServiceEntry {
                service,
                component: None,
                type_name,
            },
        );
    }

    /// Register a component: available both as a service and as a provider
    /// of named handler actions.
    pub fn register_component<C: Component>(&mut self, component: C) {
        let type_name = std::any::type_name::<C>();
        debug!(component = type_name, "Component registered");
        let shared = Arc::new(component);
        self.entries.insert(
            TypeId::of::<C>(),
            ServiceEntry {
                service: Arc::clone(&shared) as Arc<dyn Any + Send + Sync>,
                component: Some(shared),
                type_name,
            },
        );
    }

    #[must_use]
    pub fn has<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Resolve a service by type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        Arc::clone(&entry.service).downcast::<T>().ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn resolve(&self, id: &TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(id).map(|e| Arc::clone(&e.service))
    }

    pub(crate) fn component_by_id(&self, id: &TypeId) -> Option<Arc<dyn Component>> {
        self.entries
            .get(id)
            .and_then(|e| e.component.as_ref().map(Arc::clone))
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|e| e.type_name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer {
        from: &'static str,
    }

    #[test]
    fn test_register_and_get() {
        let mut container = Container::new();
        assert!(!container.has::<Mailer>());

        container.register(Mailer { from: "noreply" });
        assert!(container.has::<Mailer>());

        let mailer = container.get::<Mailer>().unwrap();
        assert_eq!(mailer.from, "noreply");
    }

    #[test]
    fn test_get_missing_type_is_none() {
        let container = Container::new();
        assert!(container.get::<Mailer>().is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut container = Container::new();
        container.register(Mailer { from: "first" });
        container.register(Mailer { from: "second" });
        assert_eq!(container.len(), 1);
        assert_eq!(container.get::<Mailer>().unwrap().from, "second");
    }

    #[test]
    fn test_register_arc_shares_instance() {
        let mut container = Container::new();
        let shared = Arc::new(Mailer { from: "shared" });
        container.register_arc(Arc::clone(&shared));
        let resolved = container.get::<Mailer>().unwrap();
        assert!(Arc::ptr_eq(&shared, &resolved));
    }
}
