//! Vector store selection and Qdrant connection settings

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vector store discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreDatabase {
    Chroma,
    Qdrant,
}

impl fmt::Display for VectorStoreDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorStoreDatabase::Chroma => f.write_str("chroma"),
            VectorStoreDatabase::Qdrant => f.write_str("qdrant"),
        }
    }
}

/// Vector store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorstoreSettings {
    pub database: VectorStoreDatabase,

    /// Collection name to use in the vector store
    #[serde(default = "default_collection_name", deserialize_with = "crate::domains::utils::scalar_string")]
    pub collection_name: String,
}

/// Qdrant client settings, only read when the vector store is `qdrant`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantSettings {
    /// `:memory:` for an in-memory instance, otherwise used as the url
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub location: Option<String>,

    /// Either a host or `[scheme]host[:port][/prefix]`
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub url: Option<String>,

    /// Port of the REST API interface
    #[serde(default = "default_qdrant_port")]
    pub port: Option<u16>,

    /// Port of the gRPC interface
    #[serde(default = "default_qdrant_grpc_port")]
    pub grpc_port: Option<u16>,

    /// Use gRPC whenever possible
    #[serde(default = "default_prefer_grpc")]
    pub prefer_grpc: Option<bool>,

    /// Use HTTPS
    pub https: Option<bool>,

    /// API key for Qdrant Cloud
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub api_key: Option<String>,

    /// Prefix added to the REST URL path, e.g. `service/v1`
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub prefix: Option<String>,

    /// Timeout in seconds for REST and gRPC requests
    pub timeout: Option<f64>,

    /// Host name; `localhost` when neither url nor host is set
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub host: Option<String>,

    /// Persistence path for the embedded local mode
    #[serde(deserialize_with = "crate::domains::utils::optional_scalar_string")]
    pub path: Option<String>,

    /// For the embedded local mode, skip the same-thread check
    #[serde(default = "default_force_disable_check_same_thread")]
    pub force_disable_check_same_thread: Option<bool>,
}

impl Default for QdrantSettings {
    fn default() -> Self {
        Self {
            location: None,
            url: None,
            port: default_qdrant_port(),
            grpc_port: default_qdrant_grpc_port(),
            prefer_grpc: default_prefer_grpc(),
            https: None,
            api_key: None,
            prefix: None,
            timeout: None,
            host: None,
            path: None,
            force_disable_check_same_thread: default_force_disable_check_same_thread(),
        }
    }
}

/// Parameters of the active vector store
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VectorStoreBackend<'a> {
    Chroma {
        collection_name: &'a str,
    },
    /// `connection` is `None` when no `qdrant` block was configured; the
    /// client then falls back to an embedded store under the data folder.
    Qdrant {
        collection_name: &'a str,
        connection: Option<&'a QdrantSettings>,
    },
}

impl VectorStoreBackend<'_> {
    pub fn database(&self) -> VectorStoreDatabase {
        match self {
            VectorStoreBackend::Chroma { .. } => VectorStoreDatabase::Chroma,
            VectorStoreBackend::Qdrant { .. } => VectorStoreDatabase::Qdrant,
        }
    }
}

impl Validatable for VectorstoreSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.collection_name, "collection_name", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "vectorstore"
    }
}

impl Validatable for QdrantSettings {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(port) = self.port {
            validate_port_range(port, "port", self.domain_name())?;
        }
        if let Some(grpc_port) = self.grpc_port {
            validate_port_range(grpc_port, "grpc_port", self.domain_name())?;
        }
        if let Some(timeout) = self.timeout {
            validate_positive(timeout, "timeout", self.domain_name())?;
        }

        let targets = [&self.location, &self.url, &self.host, &self.path]
            .iter()
            .filter(|t| t.is_some())
            .count();
        if targets > 1 {
            return Err(self.validation_error(
                "only one of location, url, host or path can be set",
            ));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "qdrant"
    }
}

// Default value functions
fn default_collection_name() -> String {
    "lantern".to_string()
}

fn default_qdrant_port() -> Option<u16> {
    Some(6333)
}

fn default_qdrant_grpc_port() -> Option<u16> {
    Some(6334)
}

fn default_prefer_grpc() -> Option<bool> {
    Some(false)
}

fn default_force_disable_check_same_thread() -> Option<bool> {
    Some(true)
}
