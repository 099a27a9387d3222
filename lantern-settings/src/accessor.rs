//! Process-wide access to the validated settings
//!
//! Components should receive `Arc<Settings>` through their constructors.
//! [`settings()`] exists for call sites that cannot have it threaded through.
//!
//! A [`SettingsAccessor`] runs its loader at most once. Concurrent first
//! callers block on the same [`OnceLock`] until the load finishes, then all
//! observe the same outcome: the same `Arc<Settings>`, or the same
//! `Arc<ConfigError>`. Failures are cached, never retried.

use crate::domains::Settings;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::SettingsLoader;
use std::sync::{Arc, OnceLock};

/// Outcome shared by every caller of an accessor
pub type SharedResult<T> = Result<T, Arc<ConfigError>>;

type Loader = Box<dyn Fn() -> ConfigResult<Settings> + Send + Sync>;

/// Lazily loaded, immutable settings slot
pub struct SettingsAccessor {
    cell: OnceLock<SharedResult<Arc<Settings>>>,
    loader: Loader,
}

impl SettingsAccessor {
    /// Accessor that runs `loader` on first access
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> ConfigResult<Settings> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            loader: Box::new(loader),
        }
    }

    /// Accessor backed by a configured pipeline
    pub fn from_loader(loader: SettingsLoader) -> Self {
        Self::new(move || loader.load())
    }

    /// Accessor that is already initialized with `settings`
    pub fn preloaded(settings: Settings) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(Arc::new(settings)));
        Self {
            cell,
            loader: Box::new(|| {
                Err(ConfigError::EnvError(
                    "preloaded settings accessor has no loader".to_string(),
                ))
            }),
        }
    }

    /// The settings, loading them on first call
    pub fn get(&self) -> SharedResult<Arc<Settings>> {
        self.cell
            .get_or_init(|| {
                tracing::debug!("loading settings");
                match (self.loader)() {
                    Ok(settings) => Ok(Arc::new(settings)),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to load settings");
                        Err(Arc::new(e))
                    }
                }
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

static GLOBAL_ACCESSOR: OnceLock<SettingsAccessor> = OnceLock::new();

/// The process-wide accessor, reading profiles and folder from the environment
pub fn global_accessor() -> &'static SettingsAccessor {
    GLOBAL_ACCESSOR.get_or_init(|| SettingsAccessor::from_loader(SettingsLoader::from_env()))
}

/// The process-wide settings.
///
/// Same instance as resolving `Settings` from [`crate::registry::global_registry`].
pub fn settings() -> SharedResult<Arc<Settings>> {
    global_accessor().get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::StaticLayerSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

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

    fn counting_accessor(base: &'static str, calls: Arc<AtomicUsize>) -> SettingsAccessor {
        let loader = SettingsLoader::new(StaticLayerSource::new().with_layer("default", base));
        SettingsAccessor::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            loader.load()
        })
    }

    #[test]
    fn test_lazy_and_identity_stable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let accessor = counting_accessor(BASE, calls.clone());
        assert!(!accessor.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = accessor.get().unwrap();
        let second = accessor.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(accessor.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let accessor = counting_accessor("llm: {mode: mock}\n", calls.clone());

        let first = accessor.get().unwrap_err();
        let second = accessor.get().unwrap_err();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(*first, ConfigError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let accessor = Arc::new(counting_accessor(BASE, calls.clone()));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let accessor = accessor.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    accessor.get().unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<Settings>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for settings in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], settings));
        }
    }

    #[test]
    fn test_preloaded() {
        let settings: Settings = serde_yaml::from_str(BASE).unwrap();
        let accessor = SettingsAccessor::preloaded(settings.clone());
        assert!(accessor.is_initialized());
        assert_eq!(*accessor.get().unwrap(), settings);
    }
}
