//! LLM backend selection and the per-backend parameter groups

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// LLM backend discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    Local,
    #[serde(rename = "openai")]
    OpenAi,
    Sagemaker,
    Mock,
}

impl LlmMode {
    pub const ALL: [LlmMode; 4] = [LlmMode::Local, LlmMode::OpenAi, LlmMode::Sagemaker, LlmMode::Mock];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Local => "local",
            LlmMode::OpenAi => "openai",
            LlmMode::Sagemaker => "sagemaker",
            LlmMode::Mock => "mock",
        }
    }
}

impl fmt::Display for LlmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub mode: LlmMode,
}

/// Local (Hugging Face) model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub llm_hf_repo_id: String,
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub llm_hf_model_file: String,
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub embedding_hf_model_name: String,
}

/// SageMaker endpoint parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagemakerSettings {
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub llm_endpoint_name: String,
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub embedding_endpoint_name: String,
}

/// OpenAI parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub api_key: String,
}

/// Parameters of the active LLM backend.
///
/// Every backend group is always present in [`crate::Settings`]; this view
/// only hands out the one the mode selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LlmBackend<'a> {
    Local(&'a LocalSettings),
    OpenAi(&'a OpenAiSettings),
    Sagemaker(&'a SagemakerSettings),
    Mock,
}

impl LlmBackend<'_> {
    pub fn mode(&self) -> LlmMode {
        match self {
            LlmBackend::Local(_) => LlmMode::Local,
            LlmBackend::OpenAi(_) => LlmMode::OpenAi,
            LlmBackend::Sagemaker(_) => LlmMode::Sagemaker,
            LlmBackend::Mock => LlmMode::Mock,
        }
    }

    /// Names of fields the active backend needs but which are blank.
    ///
    /// Not a hard error: inactive-looking values are legal until the
    /// backend is actually constructed.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        let mut blank = Vec::new();
        match self {
            LlmBackend::Local(local) => {
                if local.llm_hf_repo_id.trim().is_empty() {
                    blank.push("local.llm_hf_repo_id");
                }
                if local.llm_hf_model_file.trim().is_empty() {
                    blank.push("local.llm_hf_model_file");
                }
                if local.embedding_hf_model_name.trim().is_empty() {
                    blank.push("local.embedding_hf_model_name");
                }
            }
            LlmBackend::OpenAi(openai) => {
                if openai.api_key.trim().is_empty() {
                    blank.push("openai.api_key");
                }
            }
            LlmBackend::Sagemaker(sagemaker) => {
                if sagemaker.llm_endpoint_name.trim().is_empty() {
                    blank.push("sagemaker.llm_endpoint_name");
                }
                if sagemaker.embedding_endpoint_name.trim().is_empty() {
                    blank.push("sagemaker.embedding_endpoint_name");
                }
            }
            LlmBackend::Mock => {}
        }
        blank
    }
}

impl Validatable for LlmBackend<'_> {
    fn validate(&self) -> ConfigResult<()> {
        for field in self.blank_fields() {
            tracing::warn!(mode = %self.mode(), field, "active LLM backend has a blank field");
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        for mode in LlmMode::ALL {
            let parsed: LlmMode = serde_yaml::from_str(mode.as_str()).unwrap();
            assert_eq!(parsed, mode);
        }
        assert!(serde_yaml::from_str::<LlmMode>("gpt4all").is_err());
        assert!(serde_yaml::from_str::<LlmMode>("OpenAI").is_err());
    }

    #[test]
    fn test_blank_fields_only_for_active_backend() {
        let openai = OpenAiSettings {
            api_key: String::new(),
        };
        assert_eq!(LlmBackend::OpenAi(&openai).blank_fields(), vec!["openai.api_key"]);
        assert!(LlmBackend::Mock.blank_fields().is_empty());

        let sagemaker = SagemakerSettings {
            llm_endpoint_name: "llm".to_string(),
            embedding_endpoint_name: " ".to_string(),
        };
        assert_eq!(
            LlmBackend::Sagemaker(&sagemaker).blank_fields(),
            vec!["sagemaker.embedding_endpoint_name"]
        );
        assert!(LlmBackend::Sagemaker(&sagemaker).validate().is_ok());
    }
}
