use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use response_engine::config::{load_config, ApiConfig};
use response_engine::gateway::GatewayResponseRegistry;
use response_engine::observability::{init_logging, init_metrics};
use response_engine::routing::ApiBuilder;
use response_engine::{ApiServer, Shutdown};

#[derive(Parser)]
#[command(name = "response-engine")]
#[command(about = "Serve and inspect API response configurations", long_about = None)]
struct Cli {
    /// Path to the API configuration file.
    #[arg(short, long, default_value = "api.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local gateway emulator
    Serve {
        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Validate the configuration and print a summary
    Check,
    /// Print the gateway responses in deployment form
    GatewayResponses,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }
            serve(config).await?;
        }
        Commands::Check => check(&config)?,
        Commands::GatewayResponses => {
            let registry = GatewayResponseRegistry::from_config(&config.gateway_responses)?;
            println!("{}", serde_json::to_string_pretty(&registry.resolve_all())?);
        }
    }
    Ok(())
}

async fn serve(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("response-engine v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let table = ApiBuilder::from_config(&config)?.build();
    let gateway = GatewayResponseRegistry::from_config(&config.gateway_responses)?.freeze();

    tracing::info!(
        routes = table.len(),
        gateway_responses = gateway.resolve_all().len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, table, gateway);
    server.run(listener, shutdown.signalled()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn check(config: &ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = ApiBuilder::from_config(config)?.build();
    let gateway = GatewayResponseRegistry::from_config(&config.gateway_responses)?;

    println!("{} route(s)", table.len());
    for route in table.iter() {
        println!(
            "  {:<7} {:<30} success: {} {}  error: {} {}",
            route.method.as_str(),
            route.path,
            route.responses.success.code.map_or("-".to_string(), |c| c.as_u16().to_string()),
            route.responses.success.content_type,
            route.responses.error.code.map_or("-".to_string(), |c| c.as_u16().to_string()),
            route.responses.error.content_type,
        );
    }
    println!("{} gateway response(s)", gateway.len());
    for entry in gateway.resolve_all() {
        println!(
            "  {:<32} {}",
            entry.response_type.as_str(),
            entry.status_code.map_or("-".to_string(), |c| c.to_string())
        );
    }
    Ok(())
}
