use crate::notify::entity::{Message, NotificationOutcome};
use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// 发送通知到外部系统的接口定义。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync` 以支持并发调用。
/// - 每次调用最多发起一次远程请求，不做重试。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// 发送一条通知并返回结果。
    ///
    /// # Logic
    /// 1. 根据目标平台要求格式化消息。
    /// 2. 通过底层传输协议发送消息。
    /// 3. 将平台响应解释为成功或失败。
    ///
    /// # Arguments
    /// * `message` - 待发送的消息 (正文、标题与格式)。
    ///
    /// # Returns
    /// * `NotificationOutcome` - 成功与否以及诊断信息，发送阶段从不返回错误。
    async fn send(&self, message: &Message) -> NotificationOutcome;

    /// # Summary
    /// 以 `Result` 形式发送通知，便于调用方使用 `?`。
    ///
    /// # Logic
    /// 1. 调用 `send`。
    /// 2. 失败时按是否携带状态码映射为 `Platform` 或 `Network` 错误。
    ///
    /// # Arguments
    /// * `message` - 待发送的消息。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`。
    /// * 失败返回 `Err(NotifyError)`。
    async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
        let outcome = self.send(message).await;
        if outcome.success {
            return Ok(());
        }
        match outcome.status {
            Some(code) => Err(NotifyError::Platform(format!(
                "status {}: {}",
                code, outcome.detail
            ))),
            None => Err(NotifyError::Network(outcome.detail)),
        }
    }
}

/// # Summary
/// 远程调用前的限流闸门。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync`，同一凭证的多个适配器可以共享同一个实例。
/// - 每次远程 I/O 之前都必须先调用 `wait`。
#[async_trait]
pub trait Throttle: Send + Sync {
    /// # Summary
    /// 等待直到允许发起下一次远程调用。
    async fn wait(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNotifier(NotificationOutcome);

    #[async_trait]
    impl Notifier for FixedNotifier {
        async fn send(&self, _: &Message) -> NotificationOutcome {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_notify_maps_outcome_to_result() {
        let msg = Message::new("hello");

        let ok = FixedNotifier(NotificationOutcome::delivered(200, "ok"));
        assert!(ok.notify(&msg).await.is_ok());

        let rejected = FixedNotifier(NotificationOutcome::rejected(500, "boom"));
        assert!(matches!(
            rejected.notify(&msg).await,
            Err(NotifyError::Platform(_))
        ));

        let failed = FixedNotifier(NotificationOutcome::failed("connection refused"));
        assert!(matches!(
            failed.notify(&msg).await,
            Err(NotifyError::Network(_))
        ));
    }
}
