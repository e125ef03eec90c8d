use std::net::SocketAddr;
use std::sync::Arc;

use shared::config::ApiConfig;
use shared::gating::GatingPipeline;
use shared::llm::OpenAiGateway;
use shared::repos::history_store_from_config;
use tokio::signal;
use tracing::{error, info, warn};

mod http;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=debug,shared=info,tower_http=info".to_string()),
        )
        .init();

    if let Err(err) = dotenv_result
        && !err.not_found()
    {
        warn!("failed to load .env file: {err}");
    }

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let llm_gateway = match OpenAiGateway::new(config.completion.clone()) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build completion gateway: {err}");
            std::process::exit(1);
        }
    };

    info!(
        model = llm_gateway.model(),
        store_backend = config.store.backend().as_str(),
        "gating pipeline configured"
    );

    let pipeline = GatingPipeline::from_parts(
        Arc::new(llm_gateway),
        history_store_from_config(&config.store),
    );

    let app = http::build_router(http::AppState {
        pipeline,
        history_default_limit: config.history_default_limit,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("invalid API_BIND_ADDR {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = signal::ctrl_c().await;
        info!("shutdown signal received");
    });

    if let Err(err) = server.await {
        error!("server exited with error: {err}");
        std::process::exit(1);
    }
}
