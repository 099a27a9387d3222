//! Profile-aware settings for Lantern
//!
//! Settings are resolved from an ordered list of profiles: the `default`
//! base profile first, then every profile named in `LANTERN_PROFILES`.
//! Each profile contributes a raw YAML layer; layers are deep-merged with
//! later profiles winning, and the result is bound onto the typed
//! [`Settings`] tree, failing with a field-qualified error on the first
//! missing or invalid value.

pub mod accessor;
pub mod binder;
pub mod error;
pub mod interpolate;
pub mod layer;
pub mod loader;
pub mod merge;
pub mod profiles;
pub mod registry;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

// Domain-specific settings modules
pub mod domains;

// Re-export main types
pub use accessor::{global_accessor, settings, SettingsAccessor, SharedResult};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use layer::{FileLayerSource, LayerLoader, LayerSource, RawLayer, StaticLayerSource};
pub use loader::SettingsLoader;
pub use profiles::{ProfileName, BASE_PROFILE};
pub use registry::{global_registry, ServiceRegistry};

// Re-export domain settings
pub use domains::{
    app::{DataSettings, UiSettings},
    llm::{LlmBackend, LlmMode, LlmSettings, LocalSettings, OpenAiSettings, SagemakerSettings},
    nodestore::{
        DocumentstoreSettings, DynamoDbSettings, IndexstoreSettings, NodeStoreBackend,
        NodeStoreDatabase, RedisSettings,
    },
    server::{BasicAuthSettings, CorsSettings, JwtAuthSettings, ServerSettings},
    vectorstore::{QdrantSettings, VectorStoreBackend, VectorStoreDatabase, VectorstoreSettings},
    Settings,
};
