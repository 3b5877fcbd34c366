use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
};

use crate::catalog::{self, SchemaCatalog};
use crate::config::ServerConfig;
use crate::executor::{clickhouse::ClickhouseExecutor, WarehouseExecutor};
use crate::generation::{openai::OpenAiGenerator, SqlGenerator};

pub mod handlers;
pub mod models;

use handlers::{health_check, query_handler, schema_handler};

/// Whole-request ceiling covering the generation call and the warehouse call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Explicit, constructed dependencies shared by every request. The catalog
/// is read-only after startup, so concurrent requests share it without
/// coordination.
pub struct AppState {
    pub catalog: Arc<SchemaCatalog>,
    pub generator: Arc<dyn SqlGenerator>,
    pub executor: Arc<dyn WarehouseExecutor>,
    pub config: ServerConfig,
}

pub async fn run() {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    run_with_config(config).await;
}

pub async fn run_with_config(config: ServerConfig) {
    log::info!(
        "Server configuration: http={}:{}, schema={}",
        config.http_host,
        config.http_port,
        config.schema
    );

    let warehouse_client = crate::executor::clickhouse::build_client(&config);

    let catalog = match catalog::build(&config, &warehouse_client).await {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            log::error!("Failed to build the schema catalog: {}", e);
            log::error!("The server cannot start without a usable catalog.");
            std::process::exit(1);
        }
    };
    log::info!(
        "Catalog ready: {} tables, {} join paths",
        catalog.table_count(),
        catalog.join_graph().paths().len()
    );

    let app_state = AppState {
        catalog,
        generator: Arc::new(OpenAiGenerator::from_config(&config)),
        executor: Arc::new(ClickhouseExecutor::new(warehouse_client)),
        config: config.clone(),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/query", post(query_handler))
        .route("/schema", get(schema_handler))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(Arc::new(app_state));

    let bind_address = format!("{}:{}", config.http_host, config.http_port);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            log::info!("Listening on http://{}", bind_address);
            listener
        }
        Err(e) => {
            log::error!("Failed to bind HTTP listener to {}: {}", bind_address, e);
            log::error!("Is another process using port {}?", config.http_port);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("HTTP server fatal error: {:?}", e);
        std::process::exit(1);
    }
}
