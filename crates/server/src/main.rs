//! HTTP server for the movie agent.
//!
//! Serves `POST /api/message` and `GET /api/health` on the given address.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use server::{AgentArgs, MovieAgent, SessionLimits};

/// Movie agent web server
#[derive(Parser)]
#[command(name = "movie-agent-server")]
#[command(about = "Serve the movie agent over HTTP", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "MOVIE_AGENT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "MOVIE_AGENT_PORT", default_value = "8000")]
    port: u16,

    /// Minutes before an idle conversation is forgotten
    #[arg(long, env = "MOVIE_AGENT_SESSION_TTL_MINS", default_value = "30")]
    session_ttl_mins: u64,

    /// Most idle conversations kept in memory
    #[arg(long, env = "MOVIE_AGENT_MAX_SESSIONS", default_value = "10000")]
    max_sessions: usize,

    #[command(flatten)]
    agent: AgentArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let (llm_config, agent_config) = cli.agent.resolve()?;

    let agent = MovieAgent::connect(llm_config, agent_config)?;
    if agent.ready().await {
        info!("LLM backend is ready");
    } else {
        warn!("LLM backend is not ready yet; /api/health will report 503 until it is");
    }

    let address = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Movie agent listening on http://{}", address);

    let limits = SessionLimits {
        idle_ttl: Duration::from_secs(cli.session_ttl_mins.max(1) * 60),
        max_sessions: cli.max_sessions.max(1),
    };
    axum::serve(listener, server::router_with_limits(Arc::new(agent), limits))
        .await
        .context("HTTP server terminated")?;
    Ok(())
}
