//! Startup wiring.
//!
//! [`App::wire`] consumes a [`Registry`], checks every cross-reference,
//! constructs controller and service singletons and mounts one axum route per
//! declared handler. [`App::serve`] then binds the listener.

mod shutdown;

pub use shutdown::shutdown_signal;

use crate::config::ServerConfig;
use crate::di::{Container, Injector};
use crate::error::{GarnishError, Result};
use crate::registry::{
    BoundHandler, BoxFuture, Instance, Method, ParamBinding, QueryArgs, Registry, short_name,
};
use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::on,
};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A route as mounted on the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    /// `Controller::method` that answers the route.
    pub handler: String,
}

/// A fully wired application, ready to serve.
pub struct App {
    router: Router,
    container: Container,
    routes: Vec<RouteInfo>,
}

struct PlannedRoute {
    index: usize,
    info: RouteInfo,
}

impl App {
    /// Validates the registry and builds the router.
    ///
    /// # Errors
    /// Fails on duplicate routes, unresolved injections, routes of
    /// unregistered controllers, conflicting controller declarations,
    /// invalid paths, captures named differently at the same position, and
    /// any error raised by a factory.
    pub fn wire(registry: Registry) -> Result<Self> {
        check_controllers(&registry)?;
        check_injections(&registry)?;
        let plan = plan_routes(&registry)?;

        let container = Container::new();
        let resolving = RefCell::new(Vec::new());

        let mut service_ids: Vec<&String> = registry.services.keys().collect();
        service_ids.sort();
        for id in service_ids {
            let service = &registry.services[id];
            Injector::new(
                service.type_id,
                service.type_name,
                &registry,
                &container,
                &resolving,
            )
            .instance(id)?;
        }

        let mut instances: HashMap<TypeId, Instance> = HashMap::new();
        for controller in &registry.controllers {
            let injector = Injector::new(
                controller.type_id,
                controller.type_name,
                &registry,
                &container,
                &resolving,
            );
            let instance = (controller.factory)(&injector)?;
            tracing::info!(
                controller = short_name(controller.type_name),
                base_path = %controller.base_path,
                "controller constructed"
            );
            instances.insert(controller.type_id, instance);
        }

        let mut router = Router::new();
        let mut routes = Vec::with_capacity(plan.len());
        for PlannedRoute { index, info } in plan {
            let route = &registry.routes[index];
            let instance = instances.get(&route.controller).cloned().ok_or_else(|| {
                GarnishError::Internal(format!("no instance for {}", route.controller_name))
            })?;
            let bound = (route.binder)(instance).ok_or_else(|| {
                GarnishError::Internal(format!(
                    "handler {} is not bound to its controller type",
                    info.handler
                ))
            })?;
            let bindings = Arc::new(registry.bindings_for(route.controller, &route.method_name));

            router = router.route(&info.path, on(info.method.into(), adapter(bound, bindings)));
            tracing::info!("Mapped {} {} -> {}", info.method, info.path, info.handler);
            routes.push(info);
        }

        Ok(Self {
            router,
            container,
            routes,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// Applies `f` to the router, e.g. to add tower layers before serving.
    pub fn map_router(mut self, f: impl FnOnce(Router) -> Router) -> Self {
        self.router = f(self.router);
        self
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// A service singleton constructed during wiring. Every registered
    /// service is built by [`App::wire`], injected or not.
    pub fn service<T: 'static + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.container.resolve(id)
    }

    /// Binds `config.address()` and serves until a shutdown signal arrives.
    pub async fn serve(self, config: &ServerConfig) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(config.address()).await?;
        tracing::info!("Server running on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                tracing::info!("Initiating graceful shutdown...");
            })
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Reads the server configuration from the environment, wires the registry
/// and serves it.
pub async fn start_app(registry: Registry) -> Result<()> {
    let config = ServerConfig::from_env()?;
    App::wire(registry)?.serve(&config).await
}

/// Joins a controller base path and a route sub path, collapsing the slash
/// where both sides provide one.
pub fn join_path(base_path: &str, sub_path: &str) -> String {
    match (base_path.strip_suffix('/'), sub_path.starts_with('/')) {
        (Some(trimmed), true) => format!("{trimmed}{sub_path}"),
        _ => format!("{base_path}{sub_path}"),
    }
}

fn check_controllers(registry: &Registry) -> Result<()> {
    let mut seen: HashMap<TypeId, &str> = HashMap::new();
    for controller in &registry.controllers {
        if let Some(first) = seen.insert(controller.type_id, &controller.base_path) {
            return Err(GarnishError::ConflictingController {
                controller: short_name(controller.type_name).to_string(),
                first: first.to_string(),
                second: controller.base_path.clone(),
            });
        }
    }
    Ok(())
}

fn check_injections(registry: &Registry) -> Result<()> {
    let mut owners: Vec<_> = registry.injections.values().collect();
    owners.sort_by_key(|set| set.owner_name);
    for set in owners {
        for injection in &set.fields {
            if !registry.services.contains_key(&injection.id) {
                return Err(GarnishError::UnresolvedInjection {
                    owner: short_name(set.owner_name).to_string(),
                    field: injection.field.clone(),
                    id: injection.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn plan_routes(registry: &Registry) -> Result<Vec<PlannedRoute>> {
    let mut seen: HashMap<(Method, String), String> = HashMap::new();
    // Capture name and first path seen at each path prefix.
    let mut captures: HashMap<String, (String, String)> = HashMap::new();
    let mut plan = Vec::with_capacity(registry.routes.len());

    for (index, route) in registry.routes.iter().enumerate() {
        let controller = registry
            .controllers
            .iter()
            .find(|c| c.type_id == route.controller)
            .ok_or_else(|| GarnishError::UnregisteredController {
                controller: short_name(route.controller_name).to_string(),
                method: route.method.to_string(),
                path: route.sub_path.clone(),
            })?;

        let path = join_path(&controller.base_path, &route.sub_path);
        let segments = parse_path(&path).map_err(|reason| GarnishError::InvalidPath {
            controller: short_name(controller.type_name).to_string(),
            path: path.clone(),
            reason: reason.to_string(),
        })?;

        let handler = format!("{}::{}", short_name(route.controller_name), route.method_name);
        if let Some(first) = seen.insert((route.method, shape(&segments)), handler.clone()) {
            return Err(GarnishError::DuplicateRoute {
                method: route.method.to_string(),
                path,
                first,
                second: handler,
            });
        }

        for (position, segment) in segments.iter().enumerate() {
            let name = match segment {
                Segment::Static(_) => continue,
                Segment::Capture(name) => name.to_string(),
                Segment::Wildcard(name) => format!("*{name}"),
            };
            let prefix = shape(&segments[..position]);
            match captures.get(&prefix) {
                Some((existing_name, existing)) if *existing_name != name => {
                    return Err(GarnishError::ConflictingCapture {
                        path: path.clone(),
                        existing: existing.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    captures.insert(prefix, (name, path.clone()));
                }
            }
        }

        plan.push(PlannedRoute {
            index,
            info: RouteInfo {
                method: route.method,
                path,
                handler,
            },
        });
    }
    Ok(plan)
}

/// A path segment as the router matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    Capture(&'a str),
    Wildcard(&'a str),
}

/// Splits a joined path into segments, rejecting what the router cannot mount.
fn parse_path(path: &str) -> std::result::Result<Vec<Segment<'_>>, &'static str> {
    let rest = path.strip_prefix('/').ok_or("paths must start with '/'")?;
    let mut segments = Vec::new();
    let mut parts = rest.split('/').peekable();
    while let Some(part) = parts.next() {
        let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            Some(inner) => match inner.strip_prefix('*') {
                Some(_) if parts.peek().is_some() => {
                    return Err("a wildcard capture must be the last segment");
                }
                Some(name) => Segment::Wildcard(name),
                None => Segment::Capture(inner),
            },
            None => Segment::Static(part),
        };
        match segment {
            Segment::Static(text) if text.starts_with(':') || text.starts_with('*') => {
                return Err("captures are written as '{name}' or '{*name}'");
            }
            Segment::Static(text) if text.contains(['{', '}']) => {
                return Err("a capture must span a whole segment");
            }
            Segment::Capture(name) | Segment::Wildcard(name)
                if name.is_empty() || name.contains(['{', '}', '*']) =>
            {
                return Err("capture names must be non-empty plain identifiers");
            }
            _ => segments.push(segment),
        }
    }
    Ok(segments)
}

/// The path with capture names erased, so `/a/{x}` and `/a/{y}` compare equal.
fn shape(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Static(text) => format!("/{text}"),
            Segment::Capture(_) => "/{}".to_string(),
            Segment::Wildcard(_) => "/{*}".to_string(),
        })
        .collect()
}

fn adapter(
    bound: BoundHandler,
    bindings: Arc<BTreeMap<usize, ParamBinding>>,
) -> impl Fn(Query<HashMap<String, String>>) -> BoxFuture<Response> + Clone + Send + Sync + 'static {
    move |Query(query): Query<HashMap<String, String>>| -> BoxFuture<Response> {
        let bound = Arc::clone(&bound);
        let bindings = Arc::clone(&bindings);
        Box::pin(async move {
            let args = QueryArgs::from_query(&bindings, &query);
            match bound(args).await {
                Ok(body) => (StatusCode::OK, Json(body)).into_response(),
                Err(e) => e.into_response(),
            }
        })
    }
}
