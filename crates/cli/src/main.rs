//! `bookshelf`: run the service, apply migrations, or inspect configuration.

use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Books inventory service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Migrate the database and serve HTTP until interrupted (default)
    #[default]
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load bookshelf settings")?;

    match cli.command.unwrap_or_default() {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::serve(&settings).await
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::migrate(&settings).await?;
            tracing::info!("migrate finished");
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings.redacted())
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
