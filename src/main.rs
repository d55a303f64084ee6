//! Wiring & DI. Entry point: bootstrap the store, inject it into services, run
//! microservices and the gateway. No business logic here.

use bizdesk::adapters::fetch::{FetchState, GatewayFetcher, search_query};
use bizdesk::adapters::http::{AppState, create_router};
use bizdesk::adapters::persistence::SqliteRepo;
use bizdesk::adapters::transport::MicroserviceServer;
use bizdesk::adapters::transport::controllers::controller;
use bizdesk::shared::{AppConfig, ServiceKind};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bizdesk", version, about = "Small-business management microservices")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one microservice over TCP.
    Serve {
        service: ServiceKind,
        /// Listen address; defaults to the configured host and service port.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run the HTTP gateway in front of the microservices.
    Gateway {
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run every microservice and the gateway in one process.
    All,
    /// GET a gateway path and print the JSON result.
    Fetch {
        path: String,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        gateway: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cli = Cli::parse();
    let cfg = AppConfig::load()?;

    match cli.command {
        Command::Serve { service, listen } => {
            let repo = open_store(&cfg).await?;
            let addr = listen.unwrap_or_else(|| cfg.service_addr(service));
            let handler = controller(service, repo, cfg.page_limits_or_default());
            let server = MicroserviceServer::bind(&addr, handler).await?;
            server.run_until(shutdown_signal()).await?;
        }
        Command::Gateway { listen } => {
            run_gateway(&cfg, listen).await?;
        }
        Command::All => {
            let repo = open_store(&cfg).await?;
            for kind in ServiceKind::ALL {
                let handler = controller(kind, Arc::clone(&repo), cfg.page_limits_or_default());
                let server = MicroserviceServer::bind(&cfg.service_addr(kind), handler).await?;
                tokio::spawn(server.run());
            }
            run_gateway(&cfg, None).await?;
        }
        Command::Fetch {
            path,
            search,
            page,
            limit,
            gateway,
        } => {
            let fetcher = GatewayFetcher::new(gateway);
            match fetcher
                .fetch::<serde_json::Value>(&path, &search_query(&search, page, limit))
                .await
            {
                FetchState::Ready(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                FetchState::Failed(msg) => anyhow::bail!(msg),
                FetchState::Loading => {}
            }
        }
    }

    Ok(())
}

async fn open_store(cfg: &AppConfig) -> anyhow::Result<Arc<SqliteRepo>> {
    let data_path = cfg.data_dir_or_default();
    let data_dir_abs = data_path.canonicalize().unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");
    let repo = SqliteRepo::connect(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
    Ok(Arc::new(repo))
}

async fn run_gateway(cfg: &AppConfig, listen: Option<String>) -> anyhow::Result<()> {
    let addr = listen.unwrap_or_else(|| cfg.gateway_addr_or_default());
    let state = AppState::from_config(cfg);
    for kind in ServiceKind::ALL {
        if let Ok(client) = state.client(kind) {
            info!(service = client.service(), addr = client.addr(), "upstream service");
        }
    }
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        timeout_ms = cfg.request_timeout_or_default().as_millis() as u64,
        "gateway listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C. Without a signal handler it never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
