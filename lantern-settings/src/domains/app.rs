//! Local data storage and UI settings

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local data storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Path to local storage. Absolute if it starts with `/`, otherwise
    /// relative to the project root.
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub local_data_folder: String,
}

impl DataSettings {
    /// Resolve the data folder against a project root
    pub fn resolve(&self, project_root: impl AsRef<Path>) -> PathBuf {
        let folder = Path::new(&self.local_data_folder);
        if folder.is_absolute() {
            folder.to_path_buf()
        } else {
            project_root.as_ref().join(folder)
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Whether the UI is mounted
    pub enabled: bool,

    /// Mount path of the UI
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub path: String,
}

impl Validatable for DataSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.local_data_folder, "local_data_folder", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "data"
    }
}

impl Validatable for UiSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled && !self.path.starts_with('/') {
            tracing::warn!(path = %self.path, "ui.path does not start with '/'");
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "ui"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_folder_resolution() {
        let absolute = DataSettings {
            local_data_folder: "/var/lib/lantern".to_string(),
        };
        assert_eq!(absolute.resolve("/srv/app"), PathBuf::from("/var/lib/lantern"));

        let relative = DataSettings {
            local_data_folder: "local_data/lantern".to_string(),
        };
        assert_eq!(
            relative.resolve("/srv/app"),
            PathBuf::from("/srv/app/local_data/lantern")
        );
    }

    #[test]
    fn test_relative_ui_path_accepted() {
        let mut ui = UiSettings {
            enabled: true,
            path: "/".to_string(),
        };
        assert!(ui.validate().is_ok());

        ui.path = "ui".to_string();
        assert!(ui.validate().is_ok());

        ui.enabled = false;
        assert!(ui.validate().is_ok());
    }
}
