use clap::Parser;

use asksql::{config, server};

/// AskSQL - a natural-language query layer for ClickHouse
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTTP server host address (overrides ASKSQL_HOST)
    #[arg(long)]
    host: Option<String>,

    /// HTTP server port (overrides ASKSQL_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Catalog declaration YAML file (overrides ASKSQL_SCHEMA_FILE)
    #[arg(long)]
    schema_file: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\nAskSQL v{}\n", env!("CARGO_PKG_VERSION"));

    let mut config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let overrides = config::CliOverrides {
        http_host: cli.host,
        http_port: cli.port,
        schema_file: cli.schema_file,
    };
    if let Err(e) = config.apply_overrides(overrides) {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    server::run_with_config(config).await;
}
