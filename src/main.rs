//! ig-post-server - Instagram post metadata over HTTP.
//!
//! This binary logs into Instagram, then starts the HTTP server.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ig_post_server::{
    config::{CheckConfig, Cli, Command, ServeConfig},
    instagram::InstagramClient,
    lookup::{LookupRequest, LookupService},
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("ig-post-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Instagram user: {}", config.session.username.trim());
    info!("  Request timeout: {}s", config.session.request_timeout);
    info!("  GraphQL doc id: {}", config.session.graphql_doc_id);
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // The session must be ready before any traffic is accepted
    info!("Logging in to Instagram...");
    let client = match InstagramClient::login(
        &config.session.credentials(),
        config.session.client_options(),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Login failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !client.has_session_cookie() {
        warn!("Login succeeded but no sessionid cookie was set; lookups may fail");
    }

    let router = create_router(LookupService::new(client), build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl 'http://{}/get_post_details?shortcode=<shortcode>'", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ig_post_server=debug,tower_http=debug"
    } else {
        "ig_post_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("ig-post-server Configuration Check");
    println!("══════════════════════════════════");
    println!();

    if let Err(e) = config.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }
    println!("✓ User: {}", config.session.username.trim());

    print!("Logging in... ");
    let client = match InstagramClient::login(
        &config.session.credentials(),
        config.session.client_options(),
    )
    .await
    {
        Ok(client) => {
            println!("✓ success");
            client
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if client.has_session_cookie() {
        println!("✓ Session cookie present");
    } else {
        println!("✗ No session cookie; lookups may fail");
    }

    if config.wants_lookup() {
        let request = LookupRequest {
            shortcode: config.shortcode.clone(),
            media_id: config.media_id.clone(),
        };

        println!();
        println!("Looking up post...");

        let response = LookupService::new(client).handle(&request).await;

        println!("Status: {}", response.status);
        match serde_json::to_string_pretty(&response.envelope) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("Failed to render response: {}", e),
        }

        if !response.status.is_success() {
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("══════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
