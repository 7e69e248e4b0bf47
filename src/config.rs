//! Configuration management for the post details server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `IG_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `serve` - Log in and start the HTTP server
//! - `check` - Log in, optionally look up one post, and print the result
//!
//! # Environment Variables
//!
//! - `IG_USERNAME` - Instagram account username (required)
//! - `IG_PASSWORD` - Instagram account password (required)
//! - `IG_HOST` - Server bind address (default: 0.0.0.0)
//! - `IG_PORT` - Server port (default: 5000)
//! - `IG_REQUEST_TIMEOUT` - Per-request HTTP timeout in seconds (default: 300)
//! - `IG_GRAPHQL_DOC_ID` - GraphQL query id for post lookups
//! - `IG_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::instagram::{ClientOptions, Credentials, DEFAULT_GRAPHQL_DOC_ID};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// CLI Arguments
// =============================================================================

/// ig-post-server - Instagram post metadata over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "ig-post-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and serve the post details API
    Serve(ServeConfig),

    /// Verify the credentials and optionally look up a single post
    Check(CheckConfig),
}

/// Instagram session settings shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Instagram account username.
    #[arg(long, env = "IG_USERNAME")]
    pub username: String,

    /// Instagram account password.
    #[arg(long, env = "IG_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Timeout for each request to Instagram, in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "IG_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// GraphQL query id used for post lookups.
    ///
    /// Instagram rotates these periodically.
    #[arg(long, default_value = DEFAULT_GRAPHQL_DOC_ID, env = "IG_GRAPHQL_DOC_ID")]
    pub graphql_doc_id: String,
}

impl SessionArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Instagram username is required. Set --username or IG_USERNAME".to_string());
        }
        if self.password.is_empty() {
            return Err("Instagram password is required. Set --password or IG_PASSWORD".to_string());
        }
        if self.request_timeout == 0 {
            return Err("request_timeout must be greater than 0".to_string());
        }
        if self.graphql_doc_id.trim().is_empty() {
            return Err("graphql_doc_id must not be empty".to_string());
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.trim(), self.password.clone())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            request_timeout: Duration::from_secs(self.request_timeout),
            graphql_doc_id: self.graphql_doc_id.trim().to_string(),
            ..ClientOptions::default()
        }
    }
}

/// Settings for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IG_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.session.validate()?;

        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Look up the post with this shortcode after logging in.
    #[arg(long)]
    pub shortcode: Option<String>,

    /// Look up the post with this media id after logging in.
    #[arg(long)]
    pub media_id: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.session.validate()
    }

    /// Whether a post lookup was requested.
    pub fn wants_lookup(&self) -> bool {
        self.shortcode.is_some() || self.media_id.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
