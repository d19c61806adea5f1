//! POS client core
//!
//! 多租户餐厅 POS 客户端核心：会话协调、状态存储、可插拔数据源。
//!
//! The crate drives a hosted relational backend (auth + row CRUD + named
//! procedures + change feed) through a single [`source::DataSource`] seam.
//! A live session uses [`source::RemoteSource`]; demo/offline sessions use
//! [`source::MemorySource`] with seeded fixture data. The active source and
//! the connection mode live in one [`source::SourceSwitch`] shared by the
//! session coordinator and every store.

pub mod config;
pub mod http;
pub mod migrate;
pub mod money;
pub mod session;
pub mod source;
pub mod store;

pub use config::Config;
pub use session::SessionCoordinator;
pub use source::{ConnectionMode, DataSource, MemorySource, RemoteSource, SourceSwitch};
pub use store::{DirectoryStore, FinanceStore, PosStore};

/// 设置运行环境 (dotenv + 日志)
///
/// 二进制入口调用一次。日志级别通过 RUST_LOG 控制。
pub fn setup_environment() {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
