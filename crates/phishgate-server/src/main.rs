//! phishgate server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use phishgate_core::backend::HttpBackend;
use phishgate_core::config::{self, GatewayConfig};
use phishgate_core::dispatch::Dispatcher;
use phishgate_core::logging;
use phishgate_core::trust_list::TrustList;
use phishgate_server::router::create_router;
use phishgate_server::state::AppState;

/// Phishing-analysis gateway server.
#[derive(Debug, Parser)]
#[command(name = "phishgate")]
#[command(
    about = "Phishing analysis gateway: trust-list fast path plus remote inference",
    long_about = None
)]
struct Args {
    /// Listen address override (otherwise the PORT env var, then the config).
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Trust-list file override.
    #[arg(long, value_name = "FILE")]
    trust_list: Option<PathBuf>,

    /// Disable the trust-list fast path for this run.
    #[arg(long)]
    no_trust_list: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr when the
    // state dir is unwritable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = run(Args::parse()).await {
        eprintln!("phishgate error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut cfg = config::load_or_init().context("loading configuration")?;
    if args.no_trust_list {
        cfg.trust_list_enabled = false;
    }
    if let Some(path) = args.trust_list {
        cfg.trust_list_path = Some(path);
    }

    let trust_path = cfg.trust_list_path()?;
    let trust_list = TrustList::load(&trust_path);
    info!(
        entries = trust_list.len(),
        path = %trust_path.display(),
        "trust list loaded"
    );

    let backend = HttpBackend::new(cfg.backend_url.clone(), cfg.connect_timeout());
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(backend), trust_list, &cfg));
    let app = create_router(AppState { dispatcher });

    let addr = listen_addr(&args, &cfg);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("phishgate listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// --listen wins, then a nonempty PORT env (container platforms), then config.
fn listen_addr(args: &Args, cfg: &GatewayConfig) -> String {
    if let Some(listen) = &args.listen {
        return listen.clone();
    }
    if let Ok(port) = std::env::var("PORT") {
        if !port.is_empty() {
            return format!("0.0.0.0:{port}");
        }
    }
    cfg.listen_addr.clone()
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}
