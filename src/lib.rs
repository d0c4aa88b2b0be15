//! # garnish
//!
//! Decorator-style controllers, routes and service injection on top of axum,
//! plus a method-call logging wrapper.
//!
//! Declarations go into a [`Registry`], either through its explicit methods or
//! through the attribute macros, which expand to the same calls. At startup
//! [`App::wire`] checks the declarations, builds controller and service
//! singletons, and mounts one route per handler.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use garnish::prelude::*;
//!
//! #[derive(Injectable)]
//! #[injectable(id = "CitiesDB")]
//! pub struct CitiesDb;
//!
//! impl CitiesDb {
//!     pub fn get_cities(&self) -> Vec<&'static str> {
//!         vec!["London", "New York", "Dublin"]
//!     }
//! }
//!
//! #[controller(path = "/api")]
//! pub struct CitiesController {
//!     #[inject("CitiesDB")]
//!     cities_db: Arc<CitiesDb>,
//! }
//!
//! #[routes]
//! impl CitiesController {
//!     #[get("/cities")]
//!     pub fn get(&self) -> serde_json::Value {
//!         serde_json::json!({ "cities": self.cities_db.get_cities() })
//!     }
//! }
//!
//! #[module(controllers = [CitiesController], providers = [CitiesDb])]
//! pub struct AppModule;
//!
//! #[tokio::main]
//! async fn main() -> garnish::Result<()> {
//!     start_app(AppModule::registry()).await
//! }
//! ```

pub mod app;
pub mod config;
pub mod di;
pub mod error;
pub mod logging;
pub mod module;
pub mod registry;

// Re-export core types
pub use app::{App, RouteInfo, join_path, shutdown_signal, start_app};
pub use config::{ConfigService, ServerConfig};
pub use di::{Container, Controller, Injectable, Injector, Routes};
pub use error::{GarnishError, Result};
pub use module::Module;
pub use registry::{FromQueryValue, Method, ParamBinding, QueryArgs, Registry};

// Re-export macros
pub use garnish_macro::{
    Injectable as DeriveInjectable, controller, delete, get, logged, module, patch, post, put,
    query, routes,
};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use garnish::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::{App, start_app};
    pub use crate::config::ServerConfig;
    pub use crate::di::{Controller, Injectable, Injector, Routes};
    pub use crate::error::{GarnishError, Result};
    pub use crate::logging::{LogSink, MemorySink, Stdout};
    pub use crate::module::Module;
    pub use crate::registry::{Method, QueryArgs, Registry};
    pub use crate::{
        DeriveInjectable as Injectable, controller, delete, get, logged, module, patch, post, put,
        query, routes,
    };
    pub use std::sync::Arc;
}
