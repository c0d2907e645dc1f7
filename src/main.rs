use clap::Parser;
use log::{error, info};
use poster_studio::configuration::cli::{Cli, Command};
use poster_studio::configuration::config::Config;
use poster_studio::controller::controller_handler::Controller;
use poster_studio::generation::examples::ExampleBatch;

#[tokio::main]
async fn main() {
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("Importing configuration");
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            error!("Unable to import configuration from {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    info!("Configuration imported successfully");

    let controller = Controller::new(config).unwrap_or_else(|e| {
        error!("Unable to create a controller instance: {}, exiting...", e);
        std::process::exit(1);
    });

    let result = match cli.command() {
        Command::Serve => controller.run().await,
        Command::GenerateExamples(args) => controller
            .generate_examples(&ExampleBatch::from(args))
            .await
            .map(|written| {
                for path in written {
                    println!("Saved {}", path.display());
                }
            }),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
