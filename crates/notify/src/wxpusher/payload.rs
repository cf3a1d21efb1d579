use crate::wxpusher::content::ContentType;
use crate::wxpusher::target::Targets;
use serde::Serialize;
use wxnotify_core::notify::entity::{Message, NotifyFormat};

/// # Summary
/// Payload structure for the WxPusher `send/message` API.
///
/// # Invariants
/// * Built per send, serialized once, then discarded.
/// * `verifyPay`, `verifyPayType` and `url` are not supported and always carry fixed values.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest<'a> {
    app_token: &'a str,
    content: &'a str,
    summary: &'a str,
    content_type: u8,
    topic_ids: &'a [u128],
    uids: &'a [String],
    verify_pay: bool,
    verify_pay_type: u8,
    url: Option<&'a str>,
}

impl<'a> NotificationRequest<'a> {
    /// # Summary
    /// Assembles the request body.
    ///
    /// # Invariants
    /// * The caller has already checked that `targets` holds at least one user or topic.
    ///
    /// # Arguments
    /// * `token` - The validated app token.
    /// * `message` - Body and optional title (sent as `summary`).
    /// * `format` - The notifier's default format; a format set on `message` wins.
    /// * `targets` - Classified targets; invalid entries are never sent.
    pub fn build(
        token: &'a str,
        message: &'a Message,
        format: NotifyFormat,
        targets: &'a Targets,
    ) -> Self {
        Self {
            app_token: token,
            content: &message.body,
            summary: message.title.as_deref().unwrap_or_default(),
            content_type: ContentType::from(message.format.unwrap_or(format)).code(),
            topic_ids: targets.topics(),
            uids: targets.users(),
            verify_pay: false,
            verify_pay_type: 0,
            url: None,
        }
    }
}
