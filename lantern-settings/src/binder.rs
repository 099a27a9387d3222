//! Binding of the merged raw layer onto the typed [`Settings`] tree
//!
//! Binding is all-or-nothing: the first missing required field, wrong type
//! or out-of-set discriminator aborts the whole tree, and the error carries
//! the dotted path of the offending field. Values are not coerced, so a port
//! given as `"8001"` is a type error rather than a number.

use crate::domains::Settings;
use crate::error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
use crate::layer::RawLayer;
use serde::de::DeserializeOwned;

/// Bind and semantically validate the merged layer
pub fn bind(merged: RawLayer) -> ConfigResult<Settings> {
    let settings: Settings = bind_as(merged)?;
    settings.validate_all()?;
    tracing::debug!(
        llm_mode = %settings.llm.mode,
        vectorstore = %settings.vectorstore.database,
        documentstore = %settings.documentstore.database,
        indexstore = %settings.indexstore.database,
        "settings bound"
    );
    Ok(settings)
}

/// Structural binding only, for any settings group
pub fn bind_as<T: DeserializeOwned>(merged: RawLayer) -> ConfigResult<T> {
    serde_path_to_error::deserialize(merged.into_value())
        .map_err(|e| ConfigError::Validation(to_validation_error(e)))
}

fn to_validation_error(err: serde_path_to_error::Error<serde_yaml::Error>) -> ValidationError {
    let parent = err.path().to_string();
    let message = err.into_inner().to_string();
    let ticks = backticked(&message);

    if message.starts_with("missing field") {
        let field = ticks.first().cloned().unwrap_or_default();
        return ValidationError {
            path: join_path(&parent, &field),
            kind: ValidationErrorKind::MissingField,
        };
    }

    let kind = if message.starts_with("unknown variant") {
        let mut ticks = ticks.into_iter();
        let value = ticks.next().unwrap_or_default();
        ValidationErrorKind::NotInAllowedSet {
            value,
            allowed: ticks.collect(),
        }
    } else if message.starts_with("invalid type") || message.starts_with("invalid value") || message.starts_with("invalid length") {
        ValidationErrorKind::InvalidType(message)
    } else {
        ValidationErrorKind::Other(message)
    };

    ValidationError {
        path: display_path(&parent),
        kind,
    }
}

/// Tokens quoted in backticks by serde's error messages, in order
fn backticked(message: &str) -> Vec<String> {
    message
        .split('`')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn join_path(parent: &str, field: &str) -> String {
    if parent == "." || parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn display_path(path: &str) -> String {
    if path == "." || path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::nodestore::RedisSettings;
    use crate::profiles::ProfileName;

    fn raw(yaml: &str) -> RawLayer {
        RawLayer::parse(&ProfileName::base(), yaml).unwrap()
    }

    const COMPLETE: &str = r#"
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

    fn without(key: &str) -> RawLayer {
        let mut layer = raw(COMPLETE).into_mapping();
        layer.remove(key);
        RawLayer::from_mapping(layer)
    }

    fn validation_error(result: ConfigResult<Settings>) -> ValidationError {
        match result {
            Err(ConfigError::Validation(e)) => e,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_layer_binds() {
        let settings = bind(raw(COMPLETE)).unwrap();
        assert_eq!(settings.server.env_name, "prod");
        assert_eq!(settings.documentstore.namespace, "lantern_documents");
    }

    #[test]
    fn test_missing_group_names_group() {
        let err = validation_error(bind(without("ui")));
        assert_eq!(err.path, "ui");
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
    }

    #[test]
    fn test_missing_nested_field_is_qualified() {
        let err = validation_error(bind(raw(&COMPLETE.replace(
            "server: {env_name: prod, port: 8001}",
            "server: {env_name: prod}",
        ))));
        assert_eq!(err.path, "server.port");
        assert_eq!(err.kind, ValidationErrorKind::MissingField);

        let err = validation_error(bind(raw(&COMPLETE.replace(
            "server: {env_name: prod, port: 8001}",
            "server: {env_name: prod, port: 8001, basic_auth: {enabled: true}}",
        ))));
        assert_eq!(err.path, "server.basic_auth.secret");
    }

    #[test]
    fn test_enum_violation_lists_allowed_values() {
        let err = validation_error(bind(raw(&COMPLETE.replace("mode: mock", "mode: llamacpp"))));
        assert_eq!(err.path, "llm.mode");
        assert_eq!(
            err.kind,
            ValidationErrorKind::NotInAllowedSet {
                value: "llamacpp".to_string(),
                allowed: vec![
                    "local".to_string(),
                    "openai".to_string(),
                    "sagemaker".to_string(),
                    "mock".to_string()
                ],
            }
        );
        assert!(err.to_string().contains("llm.mode"));
    }

    #[test]
    fn test_no_lenient_coercion() {
        let err = validation_error(bind(raw(&COMPLETE.replace("port: 8001", "port: \"8001\""))));
        assert_eq!(err.path, "server.port");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidType(_)));

        let err = validation_error(bind(raw(&COMPLETE.replace("port: 8001", "port: 70000"))));
        assert_eq!(err.path, "server.port");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidType(_)));
    }

    #[test]
    fn test_scalars_bind_into_text_fields() {
        let settings = bind(raw(&COMPLETE.replace("env_name: prod", "env_name: 2024"))).unwrap();
        assert_eq!(settings.server.env_name, "2024");

        let err = validation_error(bind(raw(&COMPLETE.replace("env_name: prod", "env_name: [a]"))));
        assert_eq!(err.path, "server.env_name");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidType(_)));
    }

    #[test]
    fn test_root_type_error() {
        let err = validation_error(bind(raw(&COMPLETE.replace("ui: {enabled: true, path: /}", "ui: 5"))));
        assert_eq!(err.path, "ui");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidType(_)));
    }

    #[test]
    fn test_semantic_failure_after_binding() {
        let result = bind(raw(&COMPLETE.replace("port: 8001", "port: 0")));
        assert!(matches!(result, Err(ConfigError::DomainError { .. })));
    }

    #[test]
    fn test_bind_single_group() {
        let redis: RedisSettings = bind_as(raw("host: cache\n")).unwrap();
        assert_eq!(redis.host, "cache");
        assert_eq!(redis.port, 6379);
    }

    #[test]
    fn test_backticked() {
        assert_eq!(backticked("missing field `port`"), vec!["port"]);
        assert_eq!(
            backticked("unknown variant `x`, expected `a` or `b`"),
            vec!["x", "a", "b"]
        );
        assert!(backticked("no ticks").is_empty());
    }
}
