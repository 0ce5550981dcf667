mod args;
mod config;
mod global;
mod handlers;

use args::{ConfigArgs, DecodeArgs, EncodeArgs, FeaturesArgs};
use clap::{Parser, Subcommand};
use global::GlobalArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "msgpack-d")]
#[command(version)]
#[command(about = "SIMD-accelerated MessagePack array encoder and decoder", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON array as a MessagePack array
    Encode(EncodeArgs),
    /// Decode a MessagePack array to a JSON array
    Decode(DecodeArgs),
    /// Show CPU vector capabilities and available codec paths
    Features(FeaturesArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.log_level()));
    // A second init (tests driving run() twice) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let config = config::load_config(&cli.global)?;

    match cli.command {
        Commands::Encode(args) => handlers::encode::handle(args, &config),
        Commands::Decode(args) => handlers::decode::handle(args, &config),
        Commands::Features(args) => handlers::features::handle(args, &config),
        Commands::Config(args) => handlers::config::handle(args, &config),
    }
}
