use crate::registry::Registry;

/// A service that knows how to declare itself in a [`Registry`].
///
/// Usually implemented with `#[derive(Injectable)]`:
///
/// ```ignore
/// #[derive(Injectable)]
/// #[injectable(id = "CitiesDB")]
/// pub struct CitiesDb;
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Id the service is registered under.
    const ID: &'static str;

    fn register(registry: &mut Registry);
}

/// A route-group root, usually implemented with `#[controller(path = "...")]`.
pub trait Controller: Sized + Send + Sync + 'static {
    fn base_path() -> &'static str;

    fn register(registry: &mut Registry);
}

/// The routes of a controller, usually implemented with `#[routes]`.
pub trait Routes: Send + Sync + 'static {
    fn register_routes(registry: &mut Registry);
}
