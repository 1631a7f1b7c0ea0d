use anyhow::Context;
use chatroll::{app, cli::Cli, logging, ConfigManager};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.config.clone())?;
    let mut config = config_manager.load_config()?;
    cli.apply_to(&mut config);

    if cli.init_config {
        config_manager.save_config(&config)?;
        println!("{}", config_manager.config_path().display());
        return Ok(());
    }

    let _log_guard = logging::init_logging(&config.log, &config.log_dir())
        .context("Failed to initialize logging")?;

    tracing::info!("🎬 Starting chatroll - YouTube live chat name collector");

    tokio::select! {
        result = app::run(config) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            tracing::info!("🛑 Shutdown signal received");
            Ok(())
        }
    }
}
