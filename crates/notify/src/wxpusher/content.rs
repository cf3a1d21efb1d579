use wxnotify_core::notify::entity::NotifyFormat;

/// # Summary
/// Content type codes understood by the WxPusher API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
    Markdown,
}

impl ContentType {
    /// Wire value of the `contentType` field.
    pub fn code(self) -> u8 {
        match self {
            ContentType::Text => 0,
            ContentType::Html => 1,
            ContentType::Markdown => 2,
        }
    }
}

impl From<NotifyFormat> for ContentType {
    fn from(format: NotifyFormat) -> Self {
        match format {
            NotifyFormat::Text => ContentType::Text,
            NotifyFormat::Html => ContentType::Html,
            NotifyFormat::Markdown => ContentType::Markdown,
        }
    }
}
