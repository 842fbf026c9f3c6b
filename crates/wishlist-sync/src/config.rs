//! Session Configuration
//!
//! The host page may inject an application id, a service configuration blob
//! and a pre-issued auth token. Any of them can be missing; the session still
//! starts.

use serde_json::Value;

/// App id used when the host does not provide one
pub const DEFAULT_APP_ID: &str = "default-app-id";

/// Raw values as found on the host page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostValues {
    pub app_id: Option<String>,
    /// JSON text of the backend service configuration
    pub service_config: Option<String>,
    pub auth_token: Option<String>,
}

/// How the controller signs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Pre-issued token supplied by the host
    Token(String),
    Anonymous,
}

/// Resolved configuration the session is started with
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub app_id: String,
    pub auth: AuthMode,
    /// Passed through untouched to the backend bridge
    pub service_config: Value,
    /// False when running outside the expected host; data may not persist
    pub in_host_environment: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_host(HostValues::default())
    }
}

impl SessionConfig {
    pub fn from_host(host: HostValues) -> Self {
        let app_id = non_blank(host.app_id);
        let in_host_environment = app_id.is_some();

        let auth = match non_blank(host.auth_token) {
            Some(token) => AuthMode::Token(token),
            None => AuthMode::Anonymous,
        };

        let service_config = match non_blank(host.service_config) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable service configuration: {}", e);
                Value::Object(Default::default())
            }),
            None => Value::Object(Default::default()),
        };

        Self {
            app_id: app_id.unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
            auth,
            service_config,
            in_host_environment,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_outside_host() {
        let config = SessionConfig::default();
        assert_eq!(config.app_id, DEFAULT_APP_ID);
        assert_eq!(config.auth, AuthMode::Anonymous);
        assert_eq!(config.service_config, json!({}));
        assert!(!config.in_host_environment);
    }

    #[test]
    fn test_host_values() {
        let config = SessionConfig::from_host(HostValues {
            app_id: Some("wishlist-prod".to_string()),
            service_config: Some(r#"{"projectId":"p1"}"#.to_string()),
            auth_token: Some("tok".to_string()),
        });
        assert_eq!(config.app_id, "wishlist-prod");
        assert_eq!(config.auth, AuthMode::Token("tok".to_string()));
        assert_eq!(config.service_config, json!({"projectId": "p1"}));
        assert!(config.in_host_environment);
    }

    #[test]
    fn test_blank_token_means_anonymous() {
        let config = SessionConfig::from_host(HostValues {
            auth_token: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(config.auth, AuthMode::Anonymous);
    }

    #[test]
    fn test_malformed_service_config_degrades_to_empty() {
        let config = SessionConfig::from_host(HostValues {
            service_config: Some("{not json".to_string()),
            ..Default::default()
        });
        assert_eq!(config.service_config, json!({}));
    }
}
