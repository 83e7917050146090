use anyhow::Result;
use clap::Parser;
use janus::{cli::CLI, initializer::init_rpc_api, logging::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let CLI { log_level, opts } = CLI::parse();

    init_logging(log_level, opts.debug);

    tracing::debug!(options = ?opts, "Starting Janus");

    init_rpc_api(&opts).await?;

    Ok(())
}
