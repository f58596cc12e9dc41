// src/main.rs

use anyhow::{Context, Result, bail};
use axum::body::Body;
use axum::http::Request;
use clap::{Parser, Subcommand};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use infinite_api::config::{Config, SourceUrls};
use infinite_api::fetch::Fetcher;
use infinite_api::server::{AppState, create_app, run_server};

/// Scrapes third-party sites into typed JSON records.
#[derive(Parser, Debug)]
#[command(name = "infinite_api", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Run one request through the API in-process and print the JSON
    Get {
        /// Request path with query, e.g. `/anime/mal/top?page=2`
        path: String,
    },
}

/// The main entry point, which dispatches to the server or a one-off request.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let fetcher = Fetcher::new(&config).context("Failed to build HTTP client")?;
    let app = create_app(AppState::new(fetcher, &SourceUrls::default()));

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(&config.bind_addr(), app)
            .await
            .with_context(|| format!("Server on {} stopped", config.bind_addr())),
        Command::Get { path } => run_once(app, &path).await,
    }
}

/// Drives a single GET through the router without opening a socket.
async fn run_once(app: axum::Router, path: &str) -> Result<()> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .context("Invalid request path")?;
    let response = app.oneshot(request).await.context("Request failed")?;

    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).context("Response was not JSON")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("{path} answered {status}");
    }
    Ok(())
}
