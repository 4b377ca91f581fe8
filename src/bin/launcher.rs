// Serves the start page; the button spawns the doodle window as its own process.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use gesture_doodle::launcher::{self, LauncherConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Start page for Gesture Doodle")]
struct Args {
    /// Address to serve the page on.
    #[arg(long, default_value = "127.0.0.1:8501")]
    addr: SocketAddr,
    /// Background image for the page.
    #[arg(long, default_value = "assets/bg.jpg")]
    background: PathBuf,
    /// Doodle executable to start. Defaults to the one next to this launcher.
    #[arg(long)]
    doodle: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = LauncherConfig {
        addr: args.addr,
        background: args.background,
        doodle: args.doodle.unwrap_or_else(launcher::default_doodle_path),
    };
    log::info!("Start button runs {:?}", config.doodle);

    launcher::run(config).await?;
    Ok(())
}
