//! Service registry for dependency injection
//!
//! Components resolve their dependencies by type. `Settings` is registered
//! through a [`SettingsAccessor`], so resolving it here and calling the
//! accessor directly hand out the same `Arc`.

use crate::accessor::{global_accessor, SettingsAccessor, SharedResult};
use crate::domains::Settings;
use crate::error::ConfigError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-keyed service registry
pub struct ServiceRegistry {
    /// Singleton services
    singletons: HashMap<TypeId, AnyArc>,

    /// Service factories
    factories: HashMap<TypeId, Box<dyn ServiceFactory>>,
}

impl ServiceRegistry {
    /// Create a new service registry
    pub fn new() -> Self {
        Self {
            singletons: HashMap::new(),
            factories: HashMap::new(),
        }
    }

    /// Registry with `Settings` resolved through `accessor`
    pub fn with_settings<A>(accessor: A) -> Self
    where
        A: Deref<Target = SettingsAccessor> + Send + Sync + 'static,
    {
        let mut registry = Self::new();
        registry.register_settings(accessor);
        registry
    }

    /// Register a singleton service
    pub fn register_singleton<T>(&mut self, service: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.register_instance(Arc::new(service))
    }

    /// Register an already shared singleton
    pub fn register_instance<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.singletons.insert(TypeId::of::<T>(), service as AnyArc);
        self
    }

    /// Register a service factory, invoked on every resolve
    pub fn register_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> SharedResult<Arc<T>> + Send + Sync + 'static,
    {
        self.factories
            .insert(TypeId::of::<T>(), Box::new(TypedServiceFactory { factory }));
        self
    }

    /// Register `Settings`, delegating to `accessor` so identity is shared
    pub fn register_settings<A>(&mut self, accessor: A) -> &mut Self
    where
        A: Deref<Target = SettingsAccessor> + Send + Sync + 'static,
    {
        self.register_factory::<Settings, _>(move || accessor.get())
    }

    /// Resolve a service
    pub fn resolve<T: Send + Sync + 'static>(&self) -> SharedResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let not_found = || Arc::new(ConfigError::ServiceNotFound(std::any::type_name::<T>().to_string()));

        // Check singletons first
        if let Some(service) = self.singletons.get(&type_id) {
            return service.clone().downcast::<T>().map_err(|_| not_found());
        }

        if let Some(factory) = self.factories.get(&type_id) {
            return factory.create()?.downcast::<T>().map_err(|_| not_found());
        }

        Err(not_found())
    }

    /// Check if a service is registered
    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.singletons.contains_key(&type_id) || self.factories.contains_key(&type_id)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

trait ServiceFactory: Send + Sync {
    fn create(&self) -> SharedResult<AnyArc>;
}

struct TypedServiceFactory<F> {
    factory: F,
}

impl<T, F> ServiceFactory for TypedServiceFactory<F>
where
    T: Send + Sync + 'static,
    F: Fn() -> SharedResult<Arc<T>> + Send + Sync,
{
    fn create(&self) -> SharedResult<AnyArc> {
        Ok((self.factory)()? as AnyArc)
    }
}

static GLOBAL_REGISTRY: OnceLock<ServiceRegistry> = OnceLock::new();

/// Process-wide registry with `Settings` bound to [`global_accessor`]
pub fn global_registry() -> &'static ServiceRegistry {
    GLOBAL_REGISTRY.get_or_init(|| ServiceRegistry::with_settings(global_accessor()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
server: {env_name: prod, port: 8001}
data: {local_data_folder: /data}
ui: {enabled: true, path: /}
llm: {mode: mock}
local: {llm_hf_repo_id: repo, llm_hf_model_file: file, embedding_hf_model_name: embed}
sagemaker: {llm_endpoint_name: llm, embedding_endpoint_name: embed}
openai: {api_key: ""}
vectorstore: {database: chroma}
indexstore: {database: disk}
documentstore: {database: disk}
"#;

    #[derive(Debug)]
    struct Counter(u32);

    #[test]
    fn test_settings_identity_matches_accessor() {
        let accessor = Arc::new(SettingsAccessor::preloaded(serde_yaml::from_str(BASE).unwrap()));
        let registry = ServiceRegistry::with_settings(accessor.clone());

        assert!(registry.has::<Settings>());
        let from_registry = registry.resolve::<Settings>().unwrap();
        let from_accessor = accessor.get().unwrap();
        assert!(Arc::ptr_eq(&from_registry, &from_accessor));
        assert!(Arc::ptr_eq(&from_registry, &registry.resolve::<Settings>().unwrap()));
    }

    #[test]
    fn test_settings_failure_propagates() {
        let accessor = Arc::new(SettingsAccessor::new(|| {
            Err(ConfigError::EnvError("boom".to_string()))
        }));
        let registry = ServiceRegistry::with_settings(accessor.clone());

        let err = registry.resolve::<Settings>().unwrap_err();
        assert!(Arc::ptr_eq(&err, &accessor.get().unwrap_err()));
    }

    #[test]
    fn test_singletons_and_missing_services() {
        let mut registry = ServiceRegistry::new();
        registry.register_singleton(Counter(7));

        assert_eq!(registry.resolve::<Counter>().unwrap().0, 7);
        assert!(!registry.has::<String>());
        match registry.resolve::<String>() {
            Err(e) => assert!(matches!(*e, ConfigError::ServiceNotFound(_))),
            Ok(_) => panic!("Expected ServiceNotFound"),
        }
    }

    #[test]
    fn test_factory_runs_per_resolve() {
        let mut registry = ServiceRegistry::new();
        registry.register_factory(|| Ok(Arc::new(Counter(1))));

        let a = registry.resolve::<Counter>().unwrap();
        let b = registry.resolve::<Counter>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
