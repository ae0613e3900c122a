mod args;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use timelapse_core::{DownloadSynchronizer, ImplicitTls};

use crate::args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting timelapse downloader v{}",
        env!("CARGO_PKG_VERSION")
    );
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let sync = DownloadSynchronizer::new(
        ImplicitTls::new(),
        args.connection_config(),
        args.sync_config(),
    );
    log::debug!("Sync settings: {:?}", sync.config());

    let report = sync.run().await?;
    log::debug!("Run report:\n{}", report.to_json_pretty()?);
    Ok(())
}
