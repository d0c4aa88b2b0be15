use crate::error::{GarnishError, Result};
use crate::registry::Instance;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe store of service singletons, keyed by service id.
#[derive(Clone, Default)]
pub struct Container {
    services: Arc<DashMap<String, ServiceInstance>>,
}

#[derive(Clone)]
struct ServiceInstance {
    type_name: &'static str,
    instance: Instance,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: impl Into<String>, type_name: &'static str, instance: Instance) {
        self.services
            .insert(id.into(), ServiceInstance { type_name, instance });
    }

    pub(crate) fn get_instance(&self, id: &str) -> Option<Instance> {
        self.services.get(id).map(|entry| Arc::clone(&entry.instance))
    }

    pub fn resolve<T: 'static + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let entry = self
            .services
            .get(id)
            .ok_or_else(|| GarnishError::ServiceNotFound { id: id.to_string() })?;
        Arc::clone(&entry.instance)
            .downcast::<T>()
            .map_err(|_| GarnishError::ServiceTypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                actual: entry.type_name.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
