//! Jira MCP Server
//!
//! Exposes read-only Jira REST endpoints as MCP tools over stdio so that AI
//! agents can look up:
//! - Issues (by key, by JQL, transitions, comments)
//! - Projects (components, statuses, issue types, versions, assignable users)
//! - Priorities and status categories
//! - Boards and sprints
//!
//! Configuration comes from JIRA_HOSTNAME and JIRA_AUTH_TOKEN.

mod client;
mod config;
mod error;
mod server;

#[cfg(test)]
mod test_utils;

use anyhow::Result;
use config::Config;
use rmcp::ServiceExt;
use server::JiraServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is used for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Invalid environment variables:\n{}", e.report());
            std::process::exit(1);
        }
    };

    tracing::info!(hostname = %config.hostname, "Starting Jira MCP server");

    let server = JiraServer::from_config(&config)?;

    // Serve over stdio - pass as tuple (stdin, stdout)
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;

    tracing::info!("Jira MCP server running on stdio");

    // Wait for shutdown
    service.waiting().await?;

    Ok(())
}
