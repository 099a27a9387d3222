//! Server transport settings: port, CORS and the two auth strategies

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Name of the environment (prod, staging, local...)
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub env_name: String,

    /// Port of the HTTP server
    pub port: u16,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsSettings,

    /// HTTP basic authentication
    #[serde(default)]
    pub basic_auth: BasicAuthSettings,

    /// JWT authentication
    #[serde(default)]
    pub jwt_auth: JwtAuthSettings,
}

/// CORS configuration
///
/// When enabled with no explicit lists, the HTTP layer allows all origins,
/// methods and headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Whether CORS headers are set at all
    pub enabled: bool,

    /// Whether cookies are supported for cross-origin requests
    pub allow_credentials: bool,

    /// Origins permitted to make cross-origin requests
    pub allow_origins: Vec<String>,

    /// Regexes matched against the origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_origin_regex: Option<Vec<String>>,

    /// HTTP methods allowed for cross-origin requests
    #[serde(default = "default_cors_methods")]
    pub allow_methods: Vec<String>,

    /// Request headers supported for cross-origin requests
    pub allow_headers: Vec<String>,
}

/// HTTP basic authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAuthSettings {
    /// Whether authentication is enabled
    #[serde(default = "crate::domains::utils::default_false")]
    pub enabled: bool,

    /// The whole expected `Authorization` header value
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub secret: String,
}

/// JWT authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtAuthSettings {
    /// Whether authentication is enabled
    #[serde(default = "crate::domains::utils::default_false")]
    pub enabled: bool,

    /// URL to download JWKs from for verification
    #[serde(deserialize_with = "crate::domains::utils::scalar_string")]
    pub jwks_url: String,

    /// Claim that grants permission to ingest
    #[serde(default = "default_ingest_claim", deserialize_with = "crate::domains::utils::scalar_string")]
    pub ingest_claim: String,

    /// Claim carrying the user id
    #[serde(default = "default_user_id_claim", deserialize_with = "crate::domains::utils::scalar_string")]
    pub user_id_claim: String,

    /// Intended audience of the token
    #[serde(default = "default_audience", deserialize_with = "crate::domains::utils::scalar_string")]
    pub audience: String,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_credentials: false,
            allow_origins: Vec::new(),
            allow_origin_regex: None,
            allow_methods: default_cors_methods(),
            allow_headers: Vec::new(),
        }
    }
}

impl Default for BasicAuthSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: "secret-key".to_string(),
        }
    }
}

impl Default for JwtAuthSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            jwks_url: "https://example.com/.well-known/jwks.json".to_string(),
            ingest_claim: default_ingest_claim(),
            user_id_claim: default_user_id_claim(),
            audience: default_audience(),
        }
    }
}

impl Validatable for ServerSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_port_range(self.port, "port", self.domain_name())?;

        self.cors.validate()?;
        self.basic_auth.validate()?;
        self.jwt_auth.validate()?;

        if self.basic_auth.enabled && self.jwt_auth.enabled {
            tracing::warn!("both basic and JWT auth are enabled; requests must satisfy either");
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

impl Validatable for CorsSettings {
    /// Suspicious CORS setups are reported but never rejected
    fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }

        for pattern in self.allow_origin_regex.iter().flatten() {
            if let Err(e) = regex::Regex::new(pattern) {
                tracing::warn!(pattern = %pattern, error = %e, "allow_origin_regex does not compile");
            }
        }

        let known_methods = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "*"];
        for method in &self.allow_methods {
            if !known_methods.contains(&method.to_ascii_uppercase().as_str()) {
                tracing::warn!(method = %method, "allow_methods contains an unusual HTTP method");
            }
        }

        if self.allow_credentials && self.allow_origins.iter().any(|o| o == "*") {
            tracing::warn!("allow_credentials with a wildcard origin; browsers will refuse credentialed requests");
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server.cors"
    }
}

impl Validatable for BasicAuthSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            validate_required_string(&self.secret, "secret", self.domain_name())?;
            if self.secret == BasicAuthSettings::default().secret {
                tracing::warn!("basic auth is enabled with the built-in placeholder secret");
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server.basic_auth"
    }
}

impl Validatable for JwtAuthSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            validate_url(&self.jwks_url, "jwks_url", self.domain_name())?;
            validate_required_string(&self.ingest_claim, "ingest_claim", self.domain_name())?;
            validate_required_string(&self.user_id_claim, "user_id_claim", self.domain_name())?;
            validate_required_string(&self.audience, "audience", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server.jwt_auth"
    }
}

// Default value functions
fn default_cors_methods() -> Vec<String> {
    crate::domains::utils::string_list(&["GET"])
}

fn default_ingest_claim() -> String {
    "ingest".to_string()
}

fn default_user_id_claim() -> String {
    "sub".to_string()
}

fn default_audience() -> String {
    "lantern".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(yaml: &str) -> ServerSettings {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_server_settings_defaults() {
        let config = server("env_name: local\nport: 8001\n");
        assert_eq!(config.port, 8001);
        assert!(!config.cors.enabled);
        assert_eq!(config.cors.allow_methods, vec!["GET".to_string()]);
        assert!(config.cors.allow_origin_regex.is_none());
        assert!(!config.basic_auth.enabled);
        assert_eq!(config.basic_auth.secret, "secret-key");
        assert_eq!(config.jwt_auth.user_id_claim, "sub");
        assert_eq!(config.jwt_auth.audience, "lantern");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_auth_block_requires_its_own_fields() {
        let result: Result<ServerSettings, _> =
            serde_yaml::from_str("env_name: local\nport: 8001\nbasic_auth:\n  enabled: true\n");
        assert!(result.is_err());

        let config = server(
            "env_name: local\nport: 8001\njwt_auth:\n  enabled: true\n  jwks_url: https://auth.example.com/jwks\n",
        );
        assert!(config.jwt_auth.enabled);
        assert_eq!(config.jwt_auth.ingest_claim, "ingest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_basic_auth_validation() {
        let mut auth = BasicAuthSettings {
            enabled: true,
            secret: "Basic c2VjcmV0OmtleQ==".to_string(),
        };
        assert!(auth.validate().is_ok());

        auth.secret = "  ".to_string();
        assert!(auth.validate().is_err());

        // Blank secrets are fine while disabled
        auth.enabled = false;
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn test_jwt_auth_validation() {
        let mut jwt = JwtAuthSettings {
            enabled: true,
            ..JwtAuthSettings::default()
        };
        assert!(jwt.validate().is_ok());

        jwt.jwks_url = "not a url".to_string();
        assert!(jwt.validate().is_err());
    }

    #[test]
    fn test_cors_checks_only_warn() {
        let mut cors = CorsSettings {
            enabled: true,
            ..CorsSettings::default()
        };
        assert!(cors.validate().is_ok());

        cors.allow_methods.push("TRACE".to_string());
        assert!(cors.validate().is_ok());

        cors.allow_origin_regex = Some(vec!["([unclosed".to_string()]);
        assert!(cors.validate().is_ok());

        cors = CorsSettings {
            enabled: true,
            allow_credentials: true,
            allow_origins: vec!["*".to_string()],
            ..CorsSettings::default()
        };
        assert!(cors.validate().is_ok());
    }

    #[test]
    fn test_cors_credentials_with_wildcard_bind() {
        let config = server(
            "env_name: local\nport: 8001\ncors:\n  enabled: true\n  allow_credentials: true\n  allow_origins: [\"*\"]\n  allow_methods: [TRACE]\n",
        );
        assert!(config.cors.allow_credentials);
        assert_eq!(config.cors.allow_methods, vec!["TRACE".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_env_name_accepted() {
        let config = server("env_name: \"\"\nport: 8001\n");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_zero_rejected() {
        let config = server("env_name: local\nport: 0\n");
        assert!(config.validate().is_err());
    }
}
