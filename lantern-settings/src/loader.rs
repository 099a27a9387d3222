//! Settings loading pipeline: profiles → layers → merge → bind

use crate::binder::bind;
use crate::domains::Settings;
use crate::error::ConfigResult;
use crate::layer::{FileLayerSource, LayerLoader, LayerSource, RawLayer};
use crate::merge::merge_layers;
use crate::profiles::{profiles_from_env, resolve_profiles, ProfileName};
use std::path::PathBuf;

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "LANTERN";

/// Runs the full resolution pipeline for one ordered set of profiles
pub struct SettingsLoader {
    layers: LayerLoader,
    profiles: Vec<ProfileName>,
}

impl SettingsLoader {
    /// Loader over `source` with only the base profile active
    pub fn new(source: impl LayerSource + 'static) -> Self {
        Self {
            layers: LayerLoader::new(source),
            profiles: resolve_profiles(Vec::<String>::new()),
        }
    }

    /// Loader configured from `LANTERN_PROFILES` and `LANTERN_SETTINGS_FOLDER`
    pub fn from_env() -> Self {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Loader configured from `<PREFIX>_PROFILES` and `<PREFIX>_SETTINGS_FOLDER`.
    /// The folder defaults to the current directory.
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        let folder = std::env::var(format!("{}_SETTINGS_FOLDER", prefix))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        tracing::debug!(prefix, folder = %folder.display(), "configuring settings loader from environment");

        Self {
            layers: LayerLoader::new(FileLayerSource::new(folder)),
            profiles: profiles_from_env(&format!("{}_PROFILES", prefix)),
        }
    }

    /// Replace the requested profiles; the base profile stays first
    pub fn with_profiles<I, S>(mut self, requested: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.profiles = resolve_profiles(requested);
        self
    }

    /// Toggle `${NAME:default}` expansion in layers
    pub fn with_env_expansion(mut self, enabled: bool) -> Self {
        self.layers = self.layers.with_env_expansion(enabled);
        self
    }

    pub fn active_profiles(&self) -> &[ProfileName] {
        &self.profiles
    }

    /// Load every active profile's layer, in order
    pub fn load_layers(&self) -> ConfigResult<Vec<(ProfileName, RawLayer)>> {
        self.profiles
            .iter()
            .map(|profile| Ok((profile.clone(), self.layers.load(profile)?)))
            .collect()
    }

    /// The merged, still untyped configuration
    pub fn merged(&self) -> ConfigResult<RawLayer> {
        let layers = self.load_layers()?;
        Ok(merge_layers(layers.into_iter().map(|(_, layer)| layer)))
    }

    /// Run the whole pipeline
    pub fn load(&self) -> ConfigResult<Settings> {
        let merged = self.merged()?;
        let settings = bind(merged)?;
        tracing::info!(
            profiles = ?self.profiles.iter().map(ProfileName::as_str).collect::<Vec<_>>(),
            env_name = %settings.server.env_name,
            "settings loaded"
        );
        Ok(settings)
    }
}
