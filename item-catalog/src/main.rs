use std::sync::Arc;

use anyhow::Context;
use item_catalog::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    tracing::info!(
        environment = %config.service.environment,
        "Starting {} v{}",
        config.service.name,
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(&config.database)
        .await
        .context("connecting to the database")?;
    let handler = SqliteHandler::new(pool);
    ensure_schema(&handler)
        .await
        .context("bootstrapping the items schema")?;

    let items = ItemInteractor::new(SqlItemRepository::new(handler.clone()));
    let state = AppState::new(config.clone(), Arc::new(items)).with_database(handler);

    Server::new(config).serve(router(state)).await?;

    Ok(())
}
