// Entry point for the reverse-osmosis plant digital twin.

use anyhow::Result;
use clap::Parser;
use log::info;
use tokio::signal;

use ro_plant_twin::config::Args;
use ro_plant_twin::daemon::Daemon;

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level())
        .init();

    info!("starting daemon");
    let mut daemon = Daemon::new();
    daemon.launch(args).await?;

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("received shutdown signal, terminating daemon");
            daemon.shutdown();
            daemon.join().await?;
        }
        Err(err) => {
            eprintln!("error waiting for shutdown signal: {err}");
        }
    }

    Ok(())
}
