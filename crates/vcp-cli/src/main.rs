//! vcp - bulk operations against a virtual cluster platform
//!
//! Registers helm-deployed virtual clusters with the platform and backs up
//! the platform management plane.

mod commands;
mod prompt;

use clap::{Parser, Subcommand};
use commands::{AddVClusterCommand, BackupCommand, GlobalArgs};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "VCP_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(long, default_value = "compact", env = "VCP_LOG_FORMAT", global = true)]
    log_format: String,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add helm-deployed virtual clusters to the platform
    AddVcluster(AddVClusterCommand),
    /// Back up the platform management plane to a YAML file
    Backup(BackupCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "vcp={level},\
             vcp_cli={level},\
             vcp_core={level},\
             vcp_kube={level},\
             vcp_register={level},\
             vcp_backup={level},\
             h2=warn,\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn",
            level = log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::AddVcluster(cmd) => cmd.execute(&cli.global),
        Commands::Backup(cmd) => cmd.execute(&cli.global),
    }
}
