use thiserror::Error;

/// # Summary
/// 通知服务错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 只有构造阶段允许返回 `Config` / `InvalidUrl`，发送阶段一律收敛为 `NotificationOutcome`。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 网络连接或传输错误 (含超时)
    #[error("Network error: {0}")]
    Network(String),

    /// 配置错误 (如 Token 格式不合法)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 通知地址无法解析 (协议不匹配、缺少 Token 等)
    #[error("Invalid notification url: {0}")]
    InvalidUrl(String),

    /// 推送平台返回的错误 (非 200 状态码或 success=false)
    #[error("Platform error: {0}")]
    Platform(String),
}
