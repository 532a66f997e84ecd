use std::sync::Arc;

use anyhow::Context;
use catalog_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "catalog", version, about = "Library catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C
    Serve,
    /// Print the merged OpenAPI document
    Openapi {
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load catalog settings")?;

    match cli.command {
        Command::Serve => {
            catalog_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "catalog CLI serving");

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(catalog_app::run(settings))
        }
        Command::Openapi { pretty } => {
            // The document only depends on the registered modules, so no
            // real backend is needed.
            let registry = catalog_app::build_registry(Arc::new(catalog_db::MemoryStore::new()))?;
            let document = catalog_http::router::openapi_document(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
