use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 通知地址，形如 `wxpusher://AT_xxx/UID_xxx/123`
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// # Summary
/// 通知适配器的传输层配置。
///
/// # Invariants
/// - 超时单位为秒，限流间隔单位为毫秒。
/// - 地址查询参数 (`cto` / `rto` / `verify`) 可以按适配器覆盖这里的值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    pub connect_timeout_secs: f64,
    pub read_timeout_secs: f64,
    pub verify_certificate: bool,
    pub throttle_interval_ms: u64,
    pub user_agent: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 4.0,
            read_timeout_secs: 4.0,
            verify_certificate: true,
            throttle_interval_ms: 5500,
            user_agent: format!("wxnotify/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
