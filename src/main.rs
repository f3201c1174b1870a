//! src/main.rs
//!
//! Entrypoint: parse flags, set up logging, delegate to `app::run()`.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use loopmon::{app, config, link};

#[derive(Parser, Debug)]
#[command(name = "loopmon", version, about = "Two-loop detector monitor")]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Serial port, overrides `serial.port`.
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overrides `serial.baud_rate`.
    #[arg(short, long)]
    baud: Option<u32>,

    /// Print available serial ports and exit.
    #[arg(long)]
    list_ports: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.list_ports {
        for (name, desc) in link::list_ports()? {
            println!("{}\t{}", name, desc);
        }
        return Ok(());
    }

    let mut config = config::AppConfig::load_or_default(&cli.config)?;
    if let Some(port) = cli.port {
        config.serial.port = Some(port);
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }

    // The terminal belongs to the UI, so logs go to a file.
    let log_dir = config
        .paths
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_name = config
        .paths
        .log_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("loopmon.log"));
    let appender = tracing_appender::rolling::never(log_dir, log_name);
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,loopmon=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    tracing::info!(?config, "starting loopmon");
    app::run(config)?;
    Ok(())
}
