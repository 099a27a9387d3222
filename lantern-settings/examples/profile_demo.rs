//! Profile overlay demo
//!
//! Writes a base profile plus a `docker` overlay to a temporary folder and
//! shows how activating the overlay changes the resolved settings.

use lantern_settings::{
    ConfigError, ConfigResult, FileLayerSource, NodeStoreBackend, ProfileName, ServiceRegistry, Settings,
    SettingsAccessor, SettingsLoader,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const DOCKER_OVERLAY: &str = r#"
server:
  env_name: docker
  port: 9000
documentstore:
  database: redis
  redis:
    host: redis
    port: 6380
"#;

fn main() -> ConfigResult<()> {
    println!("🚀 Lantern Settings Profile Demo");

    let temp_dir = TempDir::new().map_err(|e| ConfigError::EnvError(format!(
        "Failed to create temp directory: {}",
        e
    )))?;

    let write = |name: &str, content: &str| {
        let path = temp_dir.path().join(name);
        fs::write(&path, content).map_err(|source| ConfigError::FileReadError { path, source })
    };
    write("settings.yaml", Settings::generate_sample())?;
    write("settings-docker.yaml", DOCKER_OVERLAY)?;

    for profiles in [vec![], vec!["docker"]] {
        let loader = SettingsLoader::new(FileLayerSource::new(temp_dir.path())).with_profiles(&profiles);
        let settings = loader.load()?;

        let names: Vec<&str> = loader.active_profiles().iter().map(ProfileName::as_str).collect();
        println!("\n📋 Profiles: {}", names.join(", "));
        println!("   Server: {} on port {}", settings.server.env_name, settings.server.port);
        match settings.documentstore.backend() {
            NodeStoreBackend::Redis(redis) => println!("   Documents: redis at {}:{}", redis.host, redis.port),
            other => println!("   Documents: {}", other.database()),
        }
    }

    // Components take the same instance through the registry
    let accessor = Arc::new(SettingsAccessor::from_loader(
        SettingsLoader::new(FileLayerSource::new(temp_dir.path())).with_profiles(["docker"]),
    ));
    let registry = ServiceRegistry::with_settings(accessor.clone());
    let injected = registry.resolve::<Settings>().map_err(|e| ConfigError::EnvError(e.to_string()))?;
    let direct = accessor.get().map_err(|e| ConfigError::EnvError(e.to_string()))?;

    println!("\n✅ Registry and accessor share one instance: {}", Arc::ptr_eq(&injected, &direct));
    Ok(())
}
