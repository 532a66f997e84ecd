//! Library catalog application.
//!
//! Wires the document store, the module registry and the HTTP facade
//! together for the `catalog-app` binary and the CLI.

pub mod modules;
pub mod utils;

use anyhow::Context;
use catalog_db::SharedStore;
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry holding every module, bound to `store`.
pub fn build_registry(store: SharedStore) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Connect the store, run the module lifecycle around the HTTP server and
/// release the store once the server has drained.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = catalog_db::connect(&settings.database)
        .await
        .context("failed to connect to the document store")?;
    let registry = build_registry(store.clone())?;

    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served =
        catalog_http::start_server(&registry, &settings, catalog_http::shutdown_signal()).await;

    registry.stop_all().await?;
    store
        .close()
        .await
        .context("failed to close the document store")?;

    served
}
