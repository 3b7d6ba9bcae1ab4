//! CLI argument definitions for the sitecms binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development and previews)
    Inmemory,
}

/// Live content server for the hospital site
#[derive(Parser, Debug)]
#[command(name = "sitecms")]
#[command(about = "Serve and edit the hospital site's live content")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the content server
    Serve(ServeArgs),
    /// Check health of a running content server
    Health(HealthArgs),
    /// Print the bundled default content tree as JSON
    Defaults(DefaultsArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "SITECMS_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "SITECMS_HOST")]
    pub host: String,

    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "SITECMS_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores sitecms.db
    /// For InMemory: stores sitecms.json
    #[arg(short = 'D', long, env = "SITECMS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "SITECMS_POSTGRES_URL")]
    pub postgres_url: Option<String>,

    /// Public origin of the site; uploaded asset URLs on it are stored as paths
    #[arg(long, env = "SITECMS_SITE_ORIGIN")]
    pub site_origin: Option<Url>,

    /// JSON file replacing the bundled default content tree
    #[arg(long, env = "SITECMS_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Username of the master account created on first start
    #[arg(long, env = "SITECMS_MASTER_USER", requires = "master_password")]
    pub master_user: Option<String>,

    /// Password of the master account created on first start
    #[arg(long, env = "SITECMS_MASTER_PASSWORD", hide_env_values = true)]
    pub master_password: Option<String>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "SITECMS_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the defaults command
#[derive(clap::Args, Debug)]
pub struct DefaultsArgs {
    /// Print on one line instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}
