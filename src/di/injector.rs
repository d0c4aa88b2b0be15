use crate::di::Container;
use crate::error::{GarnishError, Result};
use crate::registry::{Instance, Registry};
use std::any::TypeId;
use std::cell::RefCell;
use std::sync::Arc;

/// Hands out injected services to a factory while the application is wired.
///
/// An injector is scoped to the type being constructed, so [`Injector::field`]
/// can look up which service id that type declared for a field.
#[derive(Clone, Copy)]
pub struct Injector<'a> {
    owner: TypeId,
    owner_name: &'static str,
    registry: &'a Registry,
    container: &'a Container,
    resolving: &'a RefCell<Vec<String>>,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(
        owner: TypeId,
        owner_name: &'static str,
        registry: &'a Registry,
        container: &'a Container,
        resolving: &'a RefCell<Vec<String>>,
    ) -> Self {
        Self {
            owner,
            owner_name,
            registry,
            container,
            resolving,
        }
    }

    /// Type name of the controller or service being constructed.
    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    /// Resolves the service declared for `field` with `Registry::inject`.
    pub fn field<T: 'static + Send + Sync>(&self, field: &str) -> Result<Arc<T>> {
        let id = self
            .registry
            .injections
            .get(&self.owner)
            .and_then(|set| set.fields.iter().find(|i| i.field == field))
            .map(|i| i.id.as_str())
            .ok_or_else(|| GarnishError::UndeclaredInjection {
                owner: self.owner_name.to_string(),
                field: field.to_string(),
            })?;
        self.resolve(id)
    }

    /// Resolves a service singleton by id, constructing it on first use.
    pub fn resolve<T: 'static + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.instance(id)?;
        self.container.resolve::<T>(id)
    }

    pub(crate) fn instance(&self, id: &str) -> Result<Instance> {
        if let Some(instance) = self.container.get_instance(id) {
            return Ok(instance);
        }
        let registry = self.registry;
        let entry = registry
            .services
            .get(id)
            .ok_or_else(|| GarnishError::ServiceNotFound { id: id.to_string() })?;

        {
            let mut resolving = self.resolving.borrow_mut();
            if resolving.iter().any(|pending| pending == id) {
                let mut cycle = resolving.clone();
                cycle.push(id.to_string());
                return Err(GarnishError::CircularDependency {
                    cycle: cycle.join(" -> "),
                });
            }
            resolving.push(id.to_string());
        }

        let scoped = Injector {
            owner: entry.type_id,
            owner_name: entry.type_name,
            ..*self
        };
        let built = (entry.factory)(&scoped);
        self.resolving.borrow_mut().pop();

        let instance = built?;
        self.container
            .insert(id, entry.type_name, Arc::clone(&instance));
        tracing::debug!(id, service = entry.type_name, "service constructed");
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Repo {
        name: &'static str,
    }

    struct Service {
        repo: Arc<Repo>,
    }

    struct Root;

    fn with_injector<R>(registry: &Registry, f: impl FnOnce(Injector<'_>) -> R) -> R {
        let container = Container::new();
        let resolving = RefCell::new(Vec::new());
        let injector = Injector::new(
            TypeId::of::<Root>(),
            "Root",
            registry,
            &container,
            &resolving,
        );
        f(injector)
    }

    #[test]
    fn test_resolves_nested_services() {
        let mut registry = Registry::new();
        registry
            .injectable("repo", |_| Ok(Repo { name: "cities" }))
            .inject::<Service>("repo", "repo")
            .injectable("service", |injector| {
                Ok(Service {
                    repo: injector.field("repo")?,
                })
            });

        with_injector(&registry, |injector| {
            let service = injector.resolve::<Service>("service").unwrap();
            assert_eq!(service.repo.name, "cities");
        });
    }

    #[test]
    fn test_services_are_singletons() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let mut registry = Registry::new();
        registry.injectable("repo", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Repo { name: "x" })
        });

        with_injector(&registry, |injector| {
            let a = injector.resolve::<Repo>("repo").unwrap();
            let b = injector.resolve::<Repo>("repo").unwrap();
            assert!(Arc::ptr_eq(&a, &b));
        });
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detects_cycles() {
        struct A;
        struct B;
        let mut registry = Registry::new();
        registry
            .injectable("a", |injector| {
                injector.resolve::<B>("b")?;
                Ok(A)
            })
            .injectable("b", |injector| {
                injector.resolve::<A>("a")?;
                Ok(B)
            });

        with_injector(&registry, |injector| match injector.resolve::<A>("a") {
            Err(GarnishError::CircularDependency { cycle }) => assert_eq!(cycle, "a -> b -> a"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("cycle was not detected"),
        });
    }

    #[test]
    fn test_undeclared_field() {
        let registry = Registry::new();
        with_injector(&registry, |injector| {
            let err = injector.field::<Repo>("repo").err().unwrap();
            assert!(matches!(err, GarnishError::UndeclaredInjection { .. }));
        });
    }
}
