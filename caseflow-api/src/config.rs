//! API Configuration Module
//!
//! Server binding, request timeout, CORS and development seed settings.
//! Configuration is loaded from environment variables with sensible defaults
//! for development.

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::{ApiError, ApiResult};
use caseflow_core::AssignmentConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, timeouts and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind the listener to.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Requests running longer than this are aborted with 408 `TIMEOUT`.
    pub request_timeout: Duration,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    /// Example: "https://caseflow.example.org,*.caseflow.example.org"
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// JSON file with caseworkers and clients to preload into memory.
    pub seed_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            seed_file: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CASEFLOW_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `CASEFLOW_API_PORT`: Listen port (default: 3000)
    /// - `CASEFLOW_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `CASEFLOW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CASEFLOW_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `CASEFLOW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `CASEFLOW_SEED_FILE`: Path to a seed JSON file (default: none)
    pub fn from_env() -> Self {
        let bind_host =
            std::env::var("CASEFLOW_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CASEFLOW_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let request_timeout = Duration::from_secs(
            std::env::var("CASEFLOW_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );

        let cors_origins = std::env::var("CASEFLOW_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("CASEFLOW_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("CASEFLOW_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let seed_file = std::env::var("CASEFLOW_SEED_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            bind_host,
            port,
            request_timeout,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            seed_file,
        }
    }

    /// Resolve the socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.caseflow.example.org
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

// ============================================================================
// ASSIGNMENT CONFIGURATION
// ============================================================================

/// Load the workflow configuration, overriding defaults from the environment.
///
/// Environment variables:
/// - `CASEFLOW_ACCEPTANCE_WINDOW_HOURS`: Business hours to accept (default: 24)
/// - `CASEFLOW_MAX_AUTO_REASSIGNMENTS`: Escalation budget per assignment (default: 3)
/// - `CASEFLOW_AUTO_REASSIGNMENT_ENABLED`: Default for new assignments (default: true)
/// - `CASEFLOW_ESCALATION_REASON`: Reason recorded by the sweeper
pub fn assignment_config_from_env() -> ApiResult<AssignmentConfig> {
    let defaults = AssignmentConfig::default();
    let config = AssignmentConfig {
        acceptance_window_hours: std::env::var("CASEFLOW_ACCEPTANCE_WINDOW_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.acceptance_window_hours),
        max_auto_reassignment_attempts: std::env::var("CASEFLOW_MAX_AUTO_REASSIGNMENTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_auto_reassignment_attempts),
        auto_reassignment_enabled_default: std::env::var("CASEFLOW_AUTO_REASSIGNMENT_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.auto_reassignment_enabled_default),
        escalation_reason: std::env::var("CASEFLOW_ESCALATION_REASON")
            .unwrap_or(defaults.escalation_reason),
        system_actor_id: defaults.system_actor_id,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_assignment_config_defaults_are_valid() {
        // Env overrides are not set in the test environment.
        let config = assignment_config_from_env().unwrap();
        assert_eq!(config.max_auto_reassignment_attempts, 3);
        assert!(config.auto_reassignment_enabled_default);
    }

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 8080,
            ..ApiConfig::default()
        };
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_bind_addr_rejects_garbage_host() {
        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        let err = config.bind_addr().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_is_production() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());

        config.cors_origins = vec!["https://caseflow.example.org".to_string()];
        assert!(config.is_production());
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: vec![
                "https://caseflow.example.org".to_string(),
                "https://admin.caseflow.example.org".to_string(),
            ],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://caseflow.example.org"));
        assert!(config.is_origin_allowed("https://admin.caseflow.example.org"));
        assert!(!config.is_origin_allowed("https://evil.com"));
        assert!(!config.is_origin_allowed("https://notcaseflow.example.org"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let config = ApiConfig {
            cors_origins: vec!["*.caseflow.example.org".to_string()],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://app.caseflow.example.org"));
        assert!(config.is_origin_allowed("https://api.caseflow.example.org"));
        assert!(!config.is_origin_allowed("https://evilcaseflow.example.org"));
        assert!(!config.is_origin_allowed("http://app.caseflow.example.org"));
    }
}
