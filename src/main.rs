use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3mirror::cli::commands;
use s3mirror::config;

#[derive(Parser)]
#[command(name = "s3mirror")]
#[command(version, about = "Mirror local files to S3-compatible object storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file path (falls back to environment variables)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the write/delete connection test
    Test {
        /// Print the structured report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a local file to the bucket
    Put {
        /// Local file to upload
        file: PathBuf,

        /// Remote file name (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,

        /// Content type for the upload
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },

    /// Delete a mirrored file
    Rm {
        /// Remote file name
        name: String,
    },

    /// Rename a mirrored file (copy + delete, not atomic)
    Mv {
        /// Current remote file name
        old_name: String,

        /// New remote file name
        new_name: String,
    },

    /// Print a presigned GET URL
    Presign {
        /// Remote file name
        name: String,

        /// TTL in seconds (defaults to the configured presign TTL)
        #[arg(long)]
        ttl: Option<i64>,
    },

    /// Save a candidate settings file, testing the connection first
    Apply {
        /// Candidate settings file
        candidate: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // All commands are short sequential operations
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Test { json } => {
            let settings = config::load_config(cli.config.as_deref())?;
            commands::cmd_test(&settings, json).await?;
        }
        Commands::Put {
            file,
            name,
            content_type,
        } => {
            let settings = config::load_config(cli.config.as_deref())?;
            commands::cmd_put(&settings, &file, name.as_deref(), &content_type).await?;
        }
        Commands::Rm { name } => {
            let settings = config::load_config(cli.config.as_deref())?;
            commands::cmd_rm(&settings, &name).await?;
        }
        Commands::Mv { old_name, new_name } => {
            let settings = config::load_config(cli.config.as_deref())?;
            commands::cmd_mv(&settings, &old_name, &new_name).await?;
        }
        Commands::Presign { name, ttl } => {
            let settings = config::load_config(cli.config.as_deref())?;
            commands::cmd_presign(&settings, &name, ttl).await?;
        }
        Commands::Apply { candidate } => {
            let persisted = cli
                .config
                .ok_or_else(|| anyhow::anyhow!("apply needs --config for the persisted settings file"))?;
            let candidate = candidate
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("candidate path is not valid UTF-8"))?
                .to_string();
            commands::cmd_apply(&persisted, &candidate).await?;
        }
    }

    Ok(())
}
