//! Document store and index store settings
//!
//! Both stores share the same backend family (`disk`, `redis`, `dynamodb`)
//! and differ only in their default namespace.

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node store discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStoreDatabase {
    #[default]
    Disk,
    Redis,
    #[serde(rename = "dynamodb")]
    DynamoDb,
}

impl fmt::Display for NodeStoreDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStoreDatabase::Disk => f.write_str("disk"),
            NodeStoreDatabase::Redis => f.write_str("redis"),
            NodeStoreDatabase::DynamoDb => f.write_str("dynamodb"),
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub host: String,
    pub port: u16,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "redis".to_string(),
            port: 6379,
        }
    }
}

/// DynamoDB settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamoDbSettings {
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub table_name: String,
}

impl Default for DynamoDbSettings {
    fn default() -> Self {
        Self {
            table_name: "dummy_table".to_string(),
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentstoreSettings {
    pub database: NodeStoreDatabase,

    /// Namespace to store the documents in
    #[serde(default = "default_document_namespace", deserialize_with = "crate::domains::utils::scalar_string")]
    pub namespace: String,

    pub redis: RedisSettings,

    pub dynamodb: DynamoDbSettings,
}

/// Index store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexstoreSettings {
    pub database: NodeStoreDatabase,

    /// Namespace to store the index in
    #[serde(default = "default_index_namespace", deserialize_with = "crate::domains::utils::scalar_string")]
    pub namespace: String,

    pub redis: RedisSettings,

    pub dynamodb: DynamoDbSettings,
}

/// Connection parameters of the active node store backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeStoreBackend<'a> {
    Disk,
    Redis(&'a RedisSettings),
    DynamoDb(&'a DynamoDbSettings),
}

impl NodeStoreBackend<'_> {
    pub fn database(&self) -> NodeStoreDatabase {
        match self {
            NodeStoreBackend::Disk => NodeStoreDatabase::Disk,
            NodeStoreBackend::Redis(_) => NodeStoreDatabase::Redis,
            NodeStoreBackend::DynamoDb(_) => NodeStoreDatabase::DynamoDb,
        }
    }
}

fn select_backend<'a>(
    database: NodeStoreDatabase,
    redis: &'a RedisSettings,
    dynamodb: &'a DynamoDbSettings,
) -> NodeStoreBackend<'a> {
    match database {
        NodeStoreDatabase::Disk => NodeStoreBackend::Disk,
        NodeStoreDatabase::Redis => NodeStoreBackend::Redis(redis),
        NodeStoreDatabase::DynamoDb => NodeStoreBackend::DynamoDb(dynamodb),
    }
}

fn validate_backend(backend: NodeStoreBackend<'_>, domain: &str) -> ConfigResult<()> {
    match backend {
        NodeStoreBackend::Disk => Ok(()),
        NodeStoreBackend::Redis(redis) => {
            validate_required_string(&redis.host, "redis.host", domain)?;
            validate_port_range(redis.port, "redis.port", domain)
        }
        NodeStoreBackend::DynamoDb(dynamodb) => {
            validate_required_string(&dynamodb.table_name, "dynamodb.table_name", domain)
        }
    }
}

impl DocumentstoreSettings {
    pub fn backend(&self) -> NodeStoreBackend<'_> {
        select_backend(self.database, &self.redis, &self.dynamodb)
    }
}

impl IndexstoreSettings {
    pub fn backend(&self) -> NodeStoreBackend<'_> {
        select_backend(self.database, &self.redis, &self.dynamodb)
    }
}

impl Default for DocumentstoreSettings {
    fn default() -> Self {
        Self {
            database: NodeStoreDatabase::Disk,
            namespace: default_document_namespace(),
            redis: RedisSettings::default(),
            dynamodb: DynamoDbSettings::default(),
        }
    }
}

impl Default for IndexstoreSettings {
    fn default() -> Self {
        Self {
            database: NodeStoreDatabase::Disk,
            namespace: default_index_namespace(),
            redis: RedisSettings::default(),
            dynamodb: DynamoDbSettings::default(),
        }
    }
}

impl Validatable for DocumentstoreSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.namespace, "namespace", self.domain_name())?;
        validate_backend(self.backend(), self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "documentstore"
    }
}

impl Validatable for IndexstoreSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.namespace, "namespace", self.domain_name())?;
        validate_backend(self.backend(), self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "indexstore"
    }
}

// Default value functions
fn default_document_namespace() -> String {
    "lantern_documents".to_string()
}

fn default_index_namespace() -> String {
    "lantern_index".to_string()
}
