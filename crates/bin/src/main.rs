use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod session;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sitecms=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Defaults(args)) => commands::defaults::run(&args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
