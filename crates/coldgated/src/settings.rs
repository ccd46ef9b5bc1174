//! Environment-driven settings.
//!
//! Every operation needs the identifiers of the externally-owned
//! resources it drives. A missing required identifier is a configuration
//! error raised before any provider call is made — never proceed with an
//! empty name.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

/// Identifiers and admin-surface options, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Autoscaler group backing the workload.
    pub group: String,
    /// Orchestrator cluster name.
    pub cluster: String,
    /// Orchestrated service name.
    pub service: String,
    /// Front-door routing rule identifier.
    pub rule: String,
    /// Identity-provider logout URL for `/signout`.
    pub logout_url: String,
    /// Front-door session cookie names to expire on signout.
    pub session_cookies: Vec<String>,
    /// Display name of the hosted workload.
    pub app_name: String,
}

const ASG_NAME: &str = "COLDGATE_ASG_NAME";
const CLUSTER_NAME: &str = "COLDGATE_CLUSTER_NAME";
const SERVICE_NAME: &str = "COLDGATE_SERVICE_NAME";
const RULE_ID: &str = "COLDGATE_RULE_ID";
const LOGOUT_URL: &str = "COLDGATE_LOGOUT_URL";
const SESSION_COOKIES: &str = "COLDGATE_SESSION_COOKIES";
const APP_NAME: &str = "COLDGATE_APP_NAME";

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any name→value lookup (env in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let session_cookies = lookup(SESSION_COOKIES)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "cg-session-0,cg-session-1".to_string())
            .split(',')
            .map(|c| c.trim().to_string())
            .collect();

        Ok(Self {
            group: require(ASG_NAME)?,
            cluster: require(CLUSTER_NAME)?,
            service: require(SERVICE_NAME)?,
            rule: require(RULE_ID)?,
            logout_url: require(LOGOUT_URL)?,
            session_cookies,
            app_name: lookup(APP_NAME)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "ComfyUI".to_string()),
        })
    }
}
