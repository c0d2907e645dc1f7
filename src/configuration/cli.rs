use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::generation::examples::{
    ExampleBatch, EXAMPLE_CITY, EXAMPLE_COUNTRY, EXAMPLE_DISTANCE,
};

/// Command-line interface.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "poster-studio")]
#[command(version)]
#[command(about = "Generate, track and manage city map posters")]
pub struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long, short, env = "POSTER_STUDIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `server.port` from the configuration file
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Render one example poster per available theme
    GenerateExamples(GenerateExamplesArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GenerateExamplesArgs {
    /// City name, e.g. 'Råcksta'
    #[arg(long, default_value = EXAMPLE_CITY)]
    pub city: String,

    /// Country name, e.g. 'Stockholm'
    #[arg(long, default_value = EXAMPLE_COUNTRY)]
    pub country: String,

    /// Map radius in meters
    #[arg(long, default_value_t = EXAMPLE_DISTANCE, value_parser = clap::value_parser!(u64).range(1..))]
    pub distance: u64,

    /// Output folder for example images
    #[arg(long, default_value = "examples")]
    pub output_dir: PathBuf,

    /// Filename prefix; defaults to <city>_<distance>m
    #[arg(long)]
    pub prefix: Option<String>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

impl From<GenerateExamplesArgs> for ExampleBatch {
    fn from(args: GenerateExamplesArgs) -> Self {
        ExampleBatch {
            city: args.city,
            country: args.country,
            distance: args.distance,
            output_dir: args.output_dir,
            prefix: args.prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn no_arguments_means_serve_with_defaults() {
        std::env::remove_var("POSTER_STUDIO_CONFIG");
        let cli = Cli::try_parse_from(["poster-studio"]).unwrap();
        assert_eq!(cli.config, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    #[serial]
    fn serve_accepts_config_and_port() {
        std::env::remove_var("POSTER_STUDIO_CONFIG");
        let cli =
            Cli::try_parse_from(["poster-studio", "serve", "--config", "studio.toml", "--port", "9000"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("studio.toml")));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    #[serial]
    fn config_path_comes_from_environment() {
        std::env::set_var("POSTER_STUDIO_CONFIG", "/etc/poster-studio.toml");
        let cli = Cli::try_parse_from(["poster-studio"]).unwrap();
        std::env::remove_var("POSTER_STUDIO_CONFIG");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/poster-studio.toml")));
    }

    #[test]
    #[serial]
    fn generate_examples_defaults_to_the_gallery_place() {
        std::env::remove_var("POSTER_STUDIO_CONFIG");
        let cli = Cli::try_parse_from(["poster-studio", "generate-examples"]).unwrap();
        let Command::GenerateExamples(args) = cli.command() else {
            panic!("expected generate-examples");
        };
        let batch = ExampleBatch::from(args);
        assert_eq!(batch.city, "Råcksta");
        assert_eq!(batch.country, "Stockholm");
        assert_eq!(batch.distance, 1000);
        assert_eq!(batch.output_dir, PathBuf::from("examples"));
        assert_eq!(batch.prefix(), "racksta_1000m");
    }

    #[test]
    #[serial]
    fn generate_examples_takes_overrides() {
        let cli = Cli::try_parse_from([
            "poster-studio",
            "generate-examples",
            "--city",
            "Oslo",
            "--country",
            "Norway",
            "--distance",
            "2500",
            "--output-dir",
            "out",
            "--prefix",
            "demo",
        ])
        .unwrap();
        let Command::GenerateExamples(args) = cli.command() else {
            panic!("expected generate-examples");
        };
        assert_eq!(args.city, "Oslo");
        assert_eq!(args.distance, 2500);
        assert_eq!(ExampleBatch::from(args).prefix(), "demo");
    }

    #[test]
    fn zero_distance_is_rejected() {
        assert!(Cli::try_parse_from(["poster-studio", "generate-examples", "--distance", "0"]).is_err());
    }
}
