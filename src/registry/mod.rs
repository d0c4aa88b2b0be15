//! Declaration tables filled before startup.
//!
//! Every registration call writes one entry and nothing else. Cross-references
//! between tables (a route and its controller, an injection and its service)
//! are only resolved by [`App::wire`](crate::app::App::wire), so registration
//! order never matters.

mod handler;
mod method;
mod params;

pub(crate) use handler::{BoundHandler, BoxFuture, Instance};
pub use method::Method;
pub use params::{FromQueryValue, ParamBinding, QueryArgs};

use crate::di::Injector;
use crate::error::Result;
use handler::HandlerBinder;
use serde::Serialize;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

pub(crate) type Factory = Box<dyn Fn(&Injector<'_>) -> Result<Instance> + Send + Sync>;

pub(crate) struct ServiceEntry {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) factory: Factory,
}

pub(crate) struct ControllerEntry {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) base_path: String,
    pub(crate) factory: Factory,
}

pub(crate) struct RouteEntry {
    pub(crate) controller: TypeId,
    pub(crate) controller_name: &'static str,
    pub(crate) method: Method,
    pub(crate) sub_path: String,
    pub(crate) method_name: String,
    pub(crate) binder: HandlerBinder,
}

pub(crate) struct Injection {
    pub(crate) field: String,
    pub(crate) id: String,
}

pub(crate) struct InjectionSet {
    pub(crate) owner_name: &'static str,
    pub(crate) fields: Vec<Injection>,
}

/// Controllers, routes, services and injections declared for one application.
///
/// # Example
/// ```
/// use garnish::{Registry, QueryArgs};
/// use std::sync::Arc;
///
/// struct CitiesDb;
///
/// impl CitiesDb {
///     fn cities(&self) -> Vec<&'static str> {
///         vec!["London", "New York", "Dublin"]
///     }
/// }
///
/// struct CitiesController {
///     db: Arc<CitiesDb>,
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .injectable("CitiesDB", |_| Ok(CitiesDb))
///     .inject::<CitiesController>("db", "CitiesDB")
///     .controller("/api", |injector| {
///         Ok(CitiesController { db: injector.field("db")? })
///     })
///     .get("/cities", "cities", |controller: Arc<CitiesController>, _: QueryArgs| async move {
///         controller.db.cities()
///     });
/// ```
#[derive(Default)]
pub struct Registry {
    pub(crate) services: HashMap<String, ServiceEntry>,
    pub(crate) controllers: Vec<ControllerEntry>,
    pub(crate) routes: Vec<RouteEntry>,
    pub(crate) parameter_bindings: HashMap<(TypeId, String), BTreeMap<usize, ParamBinding>>,
    pub(crate) injections: HashMap<TypeId, InjectionSet>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` as the service behind `id`.
    ///
    /// A later registration under the same id replaces this one.
    pub fn injectable<T, F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Injector<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let id = id.into();
        let entry = ServiceEntry {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            factory: erase_factory(factory),
        };
        if let Some(previous) = self.services.insert(id.clone(), entry) {
            tracing::warn!(
                id = %id,
                previous = previous.type_name,
                "service id registered twice, keeping the latest"
            );
        }
        self
    }

    /// Marks `C` as a controller mounted under `base_path`.
    pub fn controller<C, F>(&mut self, base_path: impl Into<String>, factory: F) -> &mut Self
    where
        C: Send + Sync + 'static,
        F: Fn(&Injector<'_>) -> Result<C> + Send + Sync + 'static,
    {
        let base_path = base_path.into();
        let type_id = TypeId::of::<C>();
        let already_declared = self
            .controllers
            .iter()
            .any(|c| c.type_id == type_id && c.base_path == base_path);
        if !already_declared {
            self.controllers.push(ControllerEntry {
                type_id,
                type_name: std::any::type_name::<C>(),
                base_path,
                factory: erase_factory(factory),
            });
        }
        self
    }

    /// Declares a GET route on controller `C`.
    pub fn get<C, F, Fut, R>(
        &mut self,
        sub_path: impl Into<String>,
        method_name: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, QueryArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Serialize + 'static,
    {
        self.route(Method::Get, sub_path, method_name, handler)
    }

    /// Declares a route on controller `C` for any supported method.
    pub fn route<C, F, Fut, R>(
        &mut self,
        method: Method,
        sub_path: impl Into<String>,
        method_name: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, QueryArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Serialize + 'static,
    {
        self.routes.push(RouteEntry {
            controller: TypeId::of::<C>(),
            controller_name: std::any::type_name::<C>(),
            method,
            sub_path: sub_path.into(),
            method_name: method_name.into(),
            binder: handler::erase(handler),
        });
        self
    }

    /// Binds parameter `index` of `C::method_name` to the query key `name`.
    pub fn query_parameter<C>(
        &mut self,
        method_name: impl Into<String>,
        index: usize,
        name: impl Into<String>,
    ) -> &mut Self
    where
        C: 'static,
    {
        self.parameter_bindings
            .entry((TypeId::of::<C>(), method_name.into()))
            .or_default()
            .insert(index, ParamBinding::Query { name: name.into() });
        self
    }

    /// Declares that `field` of `Owner` is filled with the service behind `id`.
    pub fn inject<Owner>(&mut self, field: impl Into<String>, id: impl Into<String>) -> &mut Self
    where
        Owner: 'static,
    {
        let field = field.into();
        let id = id.into();
        let set = self
            .injections
            .entry(TypeId::of::<Owner>())
            .or_insert_with(|| InjectionSet {
                owner_name: std::any::type_name::<Owner>(),
                fields: Vec::new(),
            });
        match set.fields.iter_mut().find(|i| i.field == field) {
            Some(existing) => existing.id = id,
            None => set.fields.push(Injection { field, id }),
        }
        self
    }

    /// Runs a type's generated registration, see [`Injectable`](crate::Injectable).
    pub fn provide<T: crate::Injectable>(&mut self) -> &mut Self {
        T::register(self);
        self
    }

    /// Runs a controller's generated registration together with its routes.
    pub fn mount<C: crate::Controller + crate::Routes>(&mut self) -> &mut Self {
        C::register(self);
        C::register_routes(self);
        self
    }

    pub(crate) fn bindings_for(&self, controller: TypeId, method_name: &str) -> BTreeMap<usize, ParamBinding> {
        self.parameter_bindings
            .get(&(controller, method_name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

fn erase_factory<T, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(&Injector<'_>) -> Result<T> + Send + Sync + 'static,
{
    Box::new(move |injector| Ok(Arc::new(factory(injector)?) as Instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Db;
    struct Other;
    struct Api;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("weather_server::controllers::CitiesController"), "CitiesController");
        assert_eq!(short_name("app::Wrapper<alloc::string::String>"), "Wrapper");
        assert_eq!(short_name("Plain"), "Plain");
    }

    #[test]
    fn test_injectable_replaces_same_id() {
        let mut registry = Registry::new();
        registry.injectable("db", |_| Ok(Db));
        registry.injectable("db", |_| Ok(Other));

        assert_eq!(registry.services.len(), 1);
        assert_eq!(registry.services["db"].type_id, TypeId::of::<Other>());
    }

    #[test]
    fn test_controller_has_set_semantics() {
        let mut registry = Registry::new();
        registry.controller("/api", |_| Ok(Api));
        registry.controller("/api", |_| Ok(Api));
        assert_eq!(registry.controllers.len(), 1);

        registry.controller("/v2", |_| Ok(Api));
        assert_eq!(registry.controllers.len(), 2);
    }

    #[test]
    fn test_routes_keep_declaration_order() {
        let mut registry = Registry::new();
        registry
            .get("/b", "b", |_: Arc<Api>, _| async { 1 })
            .route(Method::Post, "/a", "a", |_: Arc<Api>, _| async { 2 });

        let declared: Vec<_> = registry
            .routes
            .iter()
            .map(|r| (r.method, r.sub_path.as_str(), r.method_name.as_str()))
            .collect();
        assert_eq!(declared, vec![(Method::Get, "/b", "b"), (Method::Post, "/a", "a")]);
    }

    #[test]
    fn test_query_parameter_bindings_are_keyed_by_method() {
        let mut registry = Registry::new();
        registry
            .query_parameter::<Api>("forecast", 1, "units")
            .query_parameter::<Api>("forecast", 0, "cityName")
            .query_parameter::<Api>("cities", 0, "country");

        let forecast = registry.bindings_for(TypeId::of::<Api>(), "forecast");
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[&0], ParamBinding::Query { name: "cityName".into() });
        assert!(registry.bindings_for(TypeId::of::<Db>(), "forecast").is_empty());
    }

    #[test]
    fn test_inject_redeclaring_a_field_keeps_one_entry() {
        let mut registry = Registry::new();
        registry
            .inject::<Api>("db", "CitiesDB")
            .inject::<Api>("cache", "Cache")
            .inject::<Api>("db", "WorldDB");

        let set = &registry.injections[&TypeId::of::<Api>()];
        let fields: Vec<_> = set.fields.iter().map(|i| (i.field.as_str(), i.id.as_str())).collect();
        assert_eq!(fields, vec![("db", "WorldDB"), ("cache", "Cache")]);
    }
}
