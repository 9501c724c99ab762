use anyhow::Context;
use clap::Parser;
use ecr_credential_sync::cli::{AppConfig, Args, Runner};
use ecr_credential_sync::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::from_args(&args).context("invalid configuration")?;
    init_logging(config.log_level);

    Runner::new(config)
        .run()
        .await
        .context("unrecoverable startup failure")?;
    Ok(())
}
