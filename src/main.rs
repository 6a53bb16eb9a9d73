//! geo-mcp: geospatial MCP tool server over stdio.
//!
//! Reads JSON-RPC requests from stdin, one per line, and writes responses
//! to stdout. Logs go to stderr.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use geo_mcp::resources::ResourceSweeper;
use geo_mcp::server::McpServer;
use geo_mcp::types::{BuildInfo, ENV_ACCESS_TOKEN};
use geo_mcp::{Config, Result};

/// Grace period for the blocking stdin reader at exit.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Parser)]
#[command(name = "geo-mcp", version, about = "Geospatial MCP tool server", long_about = None)]
struct Args {
    /// Only expose these tools (comma-separated)
    #[arg(long, value_delimiter = ',')]
    enable_tools: Option<Vec<String>>,

    /// Hide these tools (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable_tools: Option<Vec<String>>,

    /// Total attempts per upstream request, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Flags win over environment and defaults.
    fn apply(self, config: &mut Config) {
        if let Some(enabled) = self.enable_tools {
            config.tools.enabled = Some(enabled);
        }
        if let Some(disabled) = self.disable_tools {
            config.tools.disabled = disabled;
        }
        if let Some(attempts) = self.max_attempts {
            config.retry.max_attempts = attempts;
        }
        if self.log_json {
            config.observability.json_logs = true;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("geo-mcp: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(args));
    // Stdin is read on a blocking thread that may still be parked in read().
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("geo-mcp: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env();
    args.apply(&mut config);
    geo_mcp::observability::init_tracing(&config.observability);

    let build = BuildInfo::current();
    if config.api.access_token.is_none() {
        tracing::warn!("{} is not set; remote tools will return errors", ENV_ACCESS_TOKEN);
    }

    let server = Arc::new(McpServer::from_config(&config, build.clone())?);
    let mut sweeper = ResourceSweeper::new(
        server.context().resources.clone(),
        config.resources.sweep_interval,
    );
    let sweeper_handle = sweeper.start();
    tracing::info!(build = %build, revision = %build.revision, "geo_mcp_started");

    let signal_task = {
        let server = server.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("ctrl_c_received");
                server.shutdown();
            }
        })
    };

    let served = server
        .clone()
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await;

    signal_task.abort();
    sweeper.stop();
    if let Err(e) = sweeper_handle.await {
        tracing::warn!(error = %e, "resource_sweeper_join_failed");
    }
    tracing::info!(resources = server.context().resources.count(), "geo_mcp_stopped");
    served
}
