use clap::Parser;
use projection_client::config::cli::{Command, LogFormat};
use projection_client::utils::logger;
use projection_client::{CliConfig, HttpTransport, ProjectionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(),
    }

    tracing::info!("Starting projection-client");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let transport = match HttpTransport::from_config(&settings) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!("❌ Could not set up HTTP transport: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };
    tracing::info!("Using projection service at {}", transport.base_url());

    let store = ProjectionStore::with_builder(transport, settings.request_builder());

    match &config.command {
        Command::Default => store.fetch_default().await,
        Command::Project(args) => store.fetch_with_params(&args.to_params()).await,
        Command::Legacy => store.fetch_legacy().await,
    }

    let state = store.snapshot();
    println!("{}", serde_json::to_string_pretty(&state)?);

    if let Some(error) = &state.error {
        eprintln!("❌ {}", error);
        std::process::exit(1);
    }

    tracing::info!("✅ Loaded {} series", state.series.len());
    Ok(())
}
