use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use t3_cli::{execute, Cli};
use t3_lib::Settings;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::from_env().context("invalid configuration")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let output = runtime.block_on(execute(cli, &settings))?;
    println!("{}", output);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
