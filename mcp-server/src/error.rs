//! Error types for the Jira MCP server
//!
//! - `ConfigError`: startup configuration errors (fatal)
//! - `JiraError`: Jira REST client errors (caught at the tool boundary)

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A single invalid environment variable and why it was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub name: &'static str,
    pub message: String,
}

/// Configuration errors raised before the server starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variables: {}", field_names(.fields))]
    Invalid { fields: Vec<InvalidField> },
}

impl ConfigError {
    pub fn fields(&self) -> &[InvalidField] {
        match self {
            ConfigError::Invalid { fields } => fields,
        }
    }

    /// Structured validation report, keyed by variable name
    pub fn report(&self) -> String {
        #[derive(Serialize)]
        struct FieldErrors<'a> {
            #[serde(rename = "_errors")]
            errors: [&'a str; 1],
        }

        let report: BTreeMap<&str, FieldErrors<'_>> = self
            .fields()
            .iter()
            .map(|f| {
                (
                    f.name,
                    FieldErrors {
                        errors: [f.message.as_str()],
                    },
                )
            })
            .collect();

        serde_json::to_string_pretty(&report).unwrap_or_else(|_| self.to_string())
    }
}

fn field_names(fields: &[InvalidField]) -> String {
    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
}

/// Jira API client errors
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Response is missing array field `{field}`")]
    MissingField { field: &'static str },

    #[error("Invalid auth token: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_lists_every_field() {
        let err = ConfigError::Invalid {
            fields: vec![
                InvalidField {
                    name: "JIRA_HOSTNAME",
                    message: "Required".to_string(),
                },
                InvalidField {
                    name: "JIRA_AUTH_TOKEN",
                    message: "Must not be empty".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid environment variables: JIRA_HOSTNAME, JIRA_AUTH_TOKEN"
        );
    }

    #[test]
    fn test_config_error_report_is_keyed_by_variable() {
        let err = ConfigError::Invalid {
            fields: vec![InvalidField {
                name: "JIRA_AUTH_TOKEN",
                message: "Must not be empty".to_string(),
            }],
        };
        let report: serde_json::Value = serde_json::from_str(&err.report()).unwrap();
        assert_eq!(
            report,
            serde_json::json!({ "JIRA_AUTH_TOKEN": { "_errors": ["Must not be empty"] } })
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = JiraError::MissingField { field: "values" };
        assert_eq!(err.to_string(), "Response is missing array field `values`");
    }
}
