use crate::error::{GarnishError, Result};
use crate::registry::QueryArgs;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// A handler already tied to its controller singleton.
pub(crate) type BoundHandler =
    Arc<dyn Fn(QueryArgs) -> BoxFuture<Result<serde_json::Value>> + Send + Sync>;

/// Ties a type-erased handler to a controller instance. Returns `None` when
/// the instance is not of the controller type the handler was declared on.
pub(crate) type HandlerBinder = Box<dyn Fn(Instance) -> Option<BoundHandler> + Send + Sync>;

pub(crate) fn erase<C, F, Fut, R>(handler: F) -> HandlerBinder
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, QueryArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Serialize + 'static,
{
    let handler = Arc::new(handler);
    Box::new(move |instance: Instance| {
        let controller = instance.downcast::<C>().ok()?;
        let handler = Arc::clone(&handler);
        let bound: BoundHandler = Arc::new(move |args: QueryArgs| -> BoxFuture<Result<serde_json::Value>> {
            let call = (*handler)(Arc::clone(&controller), args);
            Box::pin(async move {
                let output = call.await;
                serde_json::to_value(output).map_err(GarnishError::from)
            })
        });
        Some(bound)
    })
}
