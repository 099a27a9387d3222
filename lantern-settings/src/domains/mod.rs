//! Typed settings tree, one module per functional domain

pub mod app;
pub mod llm;
pub mod nodestore;
pub mod server;
pub mod utils;
pub mod vectorstore;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

use self::app::{DataSettings, UiSettings};
use self::llm::{LlmBackend, LlmMode, LlmSettings, LocalSettings, OpenAiSettings, SagemakerSettings};
use self::nodestore::{DocumentstoreSettings, IndexstoreSettings};
use self::server::ServerSettings;
use self::vectorstore::{QdrantSettings, VectorStoreBackend, VectorStoreDatabase, VectorstoreSettings};

/// Root of the validated settings tree.
///
/// All backend groups are always present; which of them is meaningful is
/// decided by the `mode`/`database` discriminators. Prefer the
/// [`Settings::llm_backend`], [`Settings::vector_store`] and store
/// `backend()` views over reading a sibling group directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub ui: UiSettings,
    pub llm: LlmSettings,
    pub local: LocalSettings,
    pub sagemaker: SagemakerSettings,
    pub openai: OpenAiSettings,
    pub vectorstore: VectorstoreSettings,
    pub indexstore: IndexstoreSettings,
    pub documentstore: DocumentstoreSettings,

    /// Only consulted when `vectorstore.database` is `qdrant`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qdrant: Option<QdrantSettings>,
}

impl Settings {
    /// Validate all domain settings
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.data.validate()?;
        self.ui.validate()?;
        self.llm_backend().validate()?;
        self.vectorstore.validate()?;
        self.indexstore.validate()?;
        self.documentstore.validate()?;

        if let Some(ref qdrant) = self.qdrant {
            qdrant.validate()?;
        }

        Ok(())
    }

    /// Parameters of the backend selected by `llm.mode`
    pub fn llm_backend(&self) -> LlmBackend<'_> {
        match self.llm.mode {
            LlmMode::Local => LlmBackend::Local(&self.local),
            LlmMode::OpenAi => LlmBackend::OpenAi(&self.openai),
            LlmMode::Sagemaker => LlmBackend::Sagemaker(&self.sagemaker),
            LlmMode::Mock => LlmBackend::Mock,
        }
    }

    /// Parameters of the store selected by `vectorstore.database`
    pub fn vector_store(&self) -> VectorStoreBackend<'_> {
        let collection_name = self.vectorstore.collection_name.as_str();
        match self.vectorstore.database {
            VectorStoreDatabase::Chroma => VectorStoreBackend::Chroma { collection_name },
            VectorStoreDatabase::Qdrant => VectorStoreBackend::Qdrant {
                collection_name,
                connection: self.qdrant.as_ref(),
            },
        }
    }

    /// Generate a sample base settings file
    pub fn generate_sample() -> &'static str {
        SAMPLE_SETTINGS
    }
}

/// A complete base profile, suitable as a starting `settings.yaml`
pub const SAMPLE_SETTINGS: &str = r#"server:
  env_name: ${APP_ENV:prod}
  port: ${PORT:8001}
  cors:
    enabled: false
    allow_origins: ["*"]
    allow_methods: ["*"]
    allow_headers: ["*"]
  basic_auth:
    enabled: false
    secret: "Basic c2VjcmV0OmtleQ=="

data:
  local_data_folder: local_data/lantern

ui:
  enabled: true
  path: /

llm:
  mode: local

local:
  llm_hf_repo_id: TheBloke/Mistral-7B-Instruct-v0.1-GGUF
  llm_hf_model_file: mistral-7b-instruct-v0.1.Q4_K_M.gguf
  embedding_hf_model_name: BAAI/bge-small-en-v1.5

sagemaker:
  llm_endpoint_name: huggingface-pytorch-tgi-inference
  embedding_endpoint_name: huggingface-pytorch-inference

openai:
  api_key: ${OPENAI_API_KEY:}

vectorstore:
  database: qdrant

qdrant:
  path: local_data/lantern/qdrant

indexstore:
  database: disk

documentstore:
  database: disk
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::nodestore::NodeStoreBackend;

    const MINIMAL: &str = r#"
server: {env_name: test, port: 8001}
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

    fn minimal() -> Settings {
        serde_yaml::from_str(MINIMAL).unwrap()
    }

    #[test]
    fn test_minimal_settings_validate() {
        let settings = minimal();
        assert!(settings.validate_all().is_ok());
        assert!(settings.qdrant.is_none());
        assert_eq!(settings.llm_backend(), LlmBackend::Mock);
        assert_eq!(
            settings.vector_store(),
            VectorStoreBackend::Chroma { collection_name: "lantern" }
        );
        assert_eq!(settings.documentstore.backend(), NodeStoreBackend::Disk);
    }

    #[test]
    fn test_llm_view_tracks_mode() {
        let mut settings = minimal();
        settings.llm.mode = LlmMode::Local;
        match settings.llm_backend() {
            LlmBackend::Local(local) => assert_eq!(local.llm_hf_repo_id, "repo"),
            other => panic!("Expected local backend, got {:?}", other),
        }

        // A blank key on the active backend is only a warning
        settings.llm.mode = LlmMode::OpenAi;
        assert!(settings.validate_all().is_ok());
    }

    #[test]
    fn test_qdrant_view_without_block() {
        let mut settings = minimal();
        settings.vectorstore.database = VectorStoreDatabase::Qdrant;
        assert_eq!(
            settings.vector_store(),
            VectorStoreBackend::Qdrant {
                collection_name: "lantern",
                connection: None
            }
        );

        settings.qdrant = Some(QdrantSettings::default());
        match settings.vector_store() {
            VectorStoreBackend::Qdrant { connection: Some(qdrant), .. } => {
                assert_eq!(qdrant.port, Some(6333))
            }
            other => panic!("Expected qdrant connection, got {:?}", other),
        }
    }

    #[test]
    fn test_semantic_errors_name_domain() {
        let mut settings = minimal();
        settings.documentstore.namespace = String::new();
        match settings.validate_all() {
            Err(crate::ConfigError::DomainError { domain, .. }) => assert_eq!(domain, "documentstore"),
            other => panic!("Expected DomainError, got {:?}", other),
        }
    }
}
