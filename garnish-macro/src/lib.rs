use proc_macro::TokenStream;

mod controller;
mod fields;
mod http_methods;
mod injectable;
mod logged;
mod module;

/// Derive macro that declares a struct as an injectable service
///
/// The service id comes from `#[injectable(id = "...")]` and defaults to the
/// struct name. Fields marked `#[inject("id")]` must be `Arc<T>` and are
/// resolved from the registry; every other field uses `Default::default()`.
///
/// # Example
/// ```ignore
/// use garnish::prelude::*;
///
/// #[derive(Injectable)]
/// #[injectable(id = "CitiesDB")]
/// pub struct CitiesDb;
///
/// #[derive(Injectable)]
/// #[injectable(id = "Forecasts")]
/// pub struct ForecastService {
///     #[inject("CitiesDB")]
///     cities: Arc<CitiesDb>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro for defining a controller mounted under a base path
///
/// # Example
/// ```ignore
/// use garnish::prelude::*;
///
/// #[controller(path = "/api")]
/// pub struct CitiesController {
///     #[inject("CitiesDB")]
///     cities_db: Arc<CitiesDb>,
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro for declaring the routes of a controller's impl block
///
/// Methods marked `#[get("/path")]` (or `post`, `put`, `delete`, `patch`)
/// become routes. Parameters marked `#[query("name")]` are read from the query
/// string; unmarked parameters receive an absent value.
///
/// # Example
/// ```ignore
/// #[routes]
/// impl WeatherController {
///     #[get("/forecast")]
///     pub fn get(&self, #[query("cityName")] city: Option<String>) -> Forecast {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::routes_attribute(attr, item)
}

/// Attribute macro for grouping providers and controllers
///
/// # Example
/// ```ignore
/// use garnish::module;
///
/// #[module(
///     controllers = [WeatherController, CitiesController],
///     providers = [CitiesDb],
/// )]
/// pub struct AppModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}

/// Logs a timestamped line before and after each call of the function
///
/// Lines go to stdout unless another sink is named.
///
/// # Example
/// ```ignore
/// impl GithubClient {
///     #[logged]
///     pub fn get_repos(&self) -> Vec<String> {
///         // ...
///     }
///
///     #[logged(sink = self.sink)]
///     pub async fn get_stars(&self, repo: &str) -> u32 {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn logged(attr: TokenStream, item: TokenStream) -> TokenStream {
    logged::logged_attribute(attr, item)
}

/// HTTP GET method attribute for controller methods
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP POST method attribute for controller methods
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP PUT method attribute for controller methods
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP DELETE method attribute for controller methods
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// HTTP PATCH method attribute for controller methods
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute(attr, item)
}

/// Parameter attribute for query string parameters
#[proc_macro_attribute]
pub fn query(_attr: TokenStream, item: TokenStream) -> TokenStream {
    // Pass-through, actual handling is done by #[routes] macro
    item
}
