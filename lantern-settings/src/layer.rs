//! Raw configuration layers and where they come from
//!
//! A [`RawLayer`] is the untyped content of one profile. Layers are read by a
//! [`LayerSource`] (files on disk, or an in-memory map for tests) and parsed
//! by the [`LayerLoader`], which also enforces the base/optional rules:
//! the base profile must exist, any other profile may be absent.

use crate::error::{ConfigError, ConfigResult};
use crate::interpolate::expand_placeholders;
use crate::profiles::ProfileName;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Untyped, nested mapping contributed by one profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLayer(Mapping);

impl RawLayer {
    pub fn empty() -> Self {
        Self(Mapping::new())
    }

    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn into_mapping(self) -> Mapping {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by dotted path, e.g. `server.port`
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut parts = dotted.split('.');
        let mut cur = self.0.get(parts.next()?)?;
        for part in parts {
            cur = cur.as_mapping()?.get(part)?;
        }
        Some(cur)
    }

    /// Parse YAML text as a layer. An empty document is an empty layer; any
    /// other non-mapping document is rejected.
    pub fn parse(profile: &ProfileName, content: &str) -> ConfigResult<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::MalformedLayer {
            profile: profile.to_string(),
            message: e.to_string(),
        })?;

        match value {
            Value::Null => Ok(Self::empty()),
            Value::Mapping(mapping) => Ok(Self(mapping)),
            other => Err(ConfigError::MalformedLayer {
                profile: profile.to_string(),
                message: format!("expected a top-level mapping, found {}", kind_of(&other)),
            }),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Where raw profile content comes from
pub trait LayerSource: Send + Sync {
    /// Raw text for `profile`, or `None` when the source has nothing for it
    fn read(&self, profile: &ProfileName) -> ConfigResult<Option<String>>;

    /// Human-readable location of `profile`, used in errors and logs
    fn describe(&self, profile: &ProfileName) -> String;
}

/// Reads `settings.yaml` for the base profile and `settings-<name>.yaml`
/// for every other profile from one folder
#[derive(Debug, Clone)]
pub struct FileLayerSource {
    folder: PathBuf,
}

impl FileLayerSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn file_name(profile: &ProfileName) -> String {
        if profile.is_base() {
            "settings.yaml".to_string()
        } else {
            format!("settings-{}.yaml", profile)
        }
    }

    pub fn path_for(&self, profile: &ProfileName) -> PathBuf {
        self.folder.join(Self::file_name(profile))
    }
}

impl LayerSource for FileLayerSource {
    fn read(&self, profile: &ProfileName) -> ConfigResult<Option<String>> {
        let path = self.path_for(profile);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::FileReadError { path, source }),
        }
    }

    fn describe(&self, profile: &ProfileName) -> String {
        self.path_for(profile).display().to_string()
    }
}

/// In-memory layers keyed by profile name
#[derive(Debug, Clone, Default)]
pub struct StaticLayerSource {
    layers: HashMap<String, String>,
}

impl StaticLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, profile: impl Into<String>, content: impl Into<String>) -> Self {
        self.layers.insert(profile.into(), content.into());
        self
    }
}

impl LayerSource for StaticLayerSource {
    fn read(&self, profile: &ProfileName) -> ConfigResult<Option<String>> {
        Ok(self.layers.get(profile.as_str()).cloned())
    }

    fn describe(&self, profile: &ProfileName) -> String {
        format!("<memory:{}>", profile)
    }
}

/// Turns profile names into parsed layers
pub struct LayerLoader {
    source: Box<dyn LayerSource>,
    expand_env: bool,
}

impl LayerLoader {
    pub fn new(source: impl LayerSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            expand_env: true,
        }
    }

    /// Toggle `${NAME:default}` expansion (on by default)
    pub fn with_env_expansion(mut self, enabled: bool) -> Self {
        self.expand_env = enabled;
        self
    }

    pub fn source(&self) -> &dyn LayerSource {
        self.source.as_ref()
    }

    /// Load one profile's layer.
    ///
    /// The base profile must resolve to content; any other profile without
    /// content yields an empty layer.
    pub fn load(&self, profile: &ProfileName) -> ConfigResult<RawLayer> {
        let Some(content) = self.source.read(profile)? else {
            if profile.is_base() {
                return Err(ConfigError::MissingBaseProfile {
                    profile: profile.to_string(),
                    source_desc: self.source.describe(profile),
                });
            }
            tracing::info!(profile = %profile, location = %self.source.describe(profile), "profile has no settings source, skipping");
            return Ok(RawLayer::empty());
        };

        let layer = RawLayer::parse(profile, &content)?;
        if !self.expand_env {
            return Ok(layer);
        }

        let mut mapping = layer.into_mapping();
        let lookup = |name: &str| std::env::var(name).ok();
        for (_, value) in mapping.iter_mut() {
            expand_placeholders(value, &lookup).map_err(|name| {
                ConfigError::EnvError(format!(
                    "variable {} referenced by profile '{}' is not set and has no default",
                    name, profile
                ))
            })?;
        }

        tracing::debug!(profile = %profile, location = %self.source.describe(profile), "loaded settings layer");
        Ok(RawLayer(mapping))
    }
}
