use crate::registry::Registry;

/// Trait for application modules
///
/// Modules are typically defined using the `#[module]` macro, which groups
/// providers and controllers and generates their registration.
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
///
/// let registry = AppModule::registry();
/// ```
pub trait Module {
    /// Declare every provider and controller of this module
    fn register(registry: &mut Registry);

    /// Create a fresh registry holding this module's declarations
    fn registry() -> Registry {
        let mut registry = Registry::new();
        Self::register(&mut registry);
        registry
    }
}
