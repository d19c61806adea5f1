//! 客户端配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | BACKEND_URL | http://localhost:54321 | 托管后端地址 |
//! | BACKEND_ANON_KEY | (空) | 匿名 API key |
//! | BACKEND_SCHEMA | pos_system_v1 | 数据 schema 名 |
//! | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
//! | REALTIME_POLL_MS | 2000 | 变更轮询间隔(毫秒) |
//! | ENVIRONMENT | development | 运行环境 |

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// 托管后端基础 URL
    pub backend_url: String,
    /// 匿名 API key (随每个请求发送)
    pub anon_key: String,
    /// 数据 schema 名
    pub schema: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 变更轮询间隔 (毫秒)
    pub realtime_poll_ms: u64,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            anon_key: std::env::var("BACKEND_ANON_KEY").unwrap_or_default(),
            schema: std::env::var("BACKEND_SCHEMA")
                .unwrap_or_else(|_| "pos_system_v1".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            realtime_poll_ms: std::env::var("REALTIME_POLL_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(backend_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.backend_url = backend_url.into();
        config.anon_key = anon_key.into();
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
