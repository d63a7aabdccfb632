use crate::app_container::Application;
use crate::cli::Cli;
use clap::Parser;

mod app_container;
mod cli;
mod commands;
mod headless_map;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared_kernel::tracing::config_telemetry("info")?;
    let cli = Cli::parse();
    let mut app = Application::new()?;
    commands::run(cli, &mut app.dashboard).await
}
