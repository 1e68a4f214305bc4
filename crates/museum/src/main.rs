use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use museum::prelude::*;

#[derive(Parser)]
#[command(name = "museum", version, about = "Read-only archive server for classic levels")]
struct Cli {
    /// Server name, shown to players and in the server list.
    #[arg(long)]
    name: String,
    /// Message of the day.
    #[arg(long, default_value = "")]
    motd: String,
    /// Level manifest (CSV of name, path, date).
    #[arg(long, default_value = "manifest.csv")]
    manifest: PathBuf,
    /// Port to listen on.
    #[arg(long, default_value_t = 25565)]
    port: u16,
    /// Player limit announced in heartbeats.
    #[arg(long, default_value_t = 32)]
    maxconns: usize,
    /// Send heartbeats to classicube.net.
    #[arg(long)]
    heartbeat: bool,
    /// List the server publicly on classicube.net.
    #[arg(long, requires = "heartbeat")]
    public: bool,
    /// Close connections that send nothing for this many seconds.
    #[arg(long)]
    idle_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), MuseumError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = Museum::from_manifest(&cli.manifest).inspect_err(|e| {
        tracing::error!(manifest = %cli.manifest.display(), error = %e, "failed to load manifest");
    })?;

    let mut builder = MuseumServer::<Museum>::builder()
        .bind(&format!("0.0.0.0:{}", cli.port))
        .session_config(SessionConfig {
            server_name: cli.name.clone(),
            motd: cli.motd,
            idle_timeout: cli.idle_timeout_secs.map(Duration::from_secs),
        });
    if cli.heartbeat {
        builder = builder.heartbeat(Heartbeat::new(cli.name, cli.port, cli.maxconns, cli.public));
    }

    builder.build(store).await?.run().await
}
