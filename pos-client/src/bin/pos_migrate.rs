//! 架构迁移入口
//!
//! 在部署流程中独立运行，保证后端 schema 处于期望版本。

use std::sync::Arc;

use pos_client::http::RestClient;
use pos_client::migrate::MigrationRunner;
use pos_client::{Config, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_environment();

    let config = Config::from_env();
    tracing::info!(backend = %config.backend_url, schema = %config.schema, "running schema migrations");

    let client = Arc::new(RestClient::new(&config));
    let runner = MigrationRunner::new(client);

    let applied = runner.run().await?;
    if applied.is_empty() {
        tracing::info!("schema is up to date");
    } else {
        tracing::info!(?applied, "migrations applied");
    }

    Ok(())
}
