//! Connection settings for the Jira instance
//!
//! Required env vars:
//! - JIRA_HOSTNAME: host of the Jira instance (e.g., acme.atlassian.net)
//! - JIRA_AUTH_TOKEN: bearer token sent with every request

use std::env;

use crate::error::{ConfigError, InvalidField};

pub const HOSTNAME_VAR: &str = "JIRA_HOSTNAME";
pub const AUTH_TOKEN_VAR: &str = "JIRA_AUTH_TOKEN";

#[derive(Clone)]
pub struct Config {
    pub hostname: String,
    pub auth_token: String,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Validate settings produced by `lookup`. Every invalid field is reported,
    /// not just the first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut fields = Vec::new();
        let hostname = required(&lookup, HOSTNAME_VAR, &mut fields);
        let auth_token = required(&lookup, AUTH_TOKEN_VAR, &mut fields);

        match (hostname, auth_token) {
            (Some(hostname), Some(auth_token)) if fields.is_empty() => Ok(Self {
                hostname,
                auth_token,
            }),
            _ => Err(ConfigError::Invalid { fields }),
        }
    }

    /// Base URL of the instance. Bare hostnames are served over https; a value
    /// that already names a scheme is kept.
    pub fn base_url(&self) -> String {
        let host = self.hostname.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

// Token stays out of Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

fn required<F>(lookup: &F, name: &'static str, fields: &mut Vec<InvalidField>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => {
            fields.push(InvalidField {
                name,
                message: "Required".to_string(),
            });
            None
        }
        Some(value) if value.trim().is_empty() => {
            fields.push(InvalidField {
                name,
                message: "Must not be empty".to_string(),
            });
            None
        }
        Some(value) => Some(value.trim().to_string()),
    }
}
