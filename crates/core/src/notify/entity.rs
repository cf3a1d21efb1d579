use std::str::FromStr;

/// # Summary
/// 消息正文格式。
///
/// # Invariants
/// - 封闭集合：纯文本、Markdown、HTML。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NotifyFormat {
    // 纯文本
    #[default]
    Text,
    // Markdown
    Markdown,
    // HTML
    Html,
}

impl FromStr for NotifyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(NotifyFormat::Text),
            "markdown" => Ok(NotifyFormat::Markdown),
            "html" => Ok(NotifyFormat::Html),
            _ => Err(format!("Unknown NotifyFormat: {}", s)),
        }
    }
}

impl std::fmt::Display for NotifyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyFormat::Text => write!(f, "text"),
            NotifyFormat::Markdown => write!(f, "markdown"),
            NotifyFormat::Html => write!(f, "html"),
        }
    }
}

/// # Summary
/// 一条待发送的消息。
///
/// # Invariants
/// - `body` 为正文；`title` 可选，缺省时按空字符串发送。
/// - `format` 可选，缺省时使用通知器自身的默认格式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    pub title: Option<String>,
    pub format: Option<NotifyFormat>,
}

impl Message {
    /// # Summary
    /// 创建不带标题、使用默认格式的消息。
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            title: None,
            format: None,
        }
    }

    /// # Summary
    /// 附加标题。
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// # Summary
    /// 为本条消息指定正文格式，覆盖通知器的默认格式。
    pub fn with_format(mut self, format: NotifyFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// # Summary
/// 敏感字段 (如 Token) 在地址中的脱敏方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyMode {
    // 完全隐藏：`****`
    Secret,
    // 保留首尾各一个字符：`A...z`
    Partial,
    // 仅保留末尾四个字符：`...wxyz`
    Tail,
}

impl PrivacyMode {
    /// # Summary
    /// 按当前模式对敏感值脱敏。
    ///
    /// # Logic
    /// 1. `Secret` 总是返回固定的 `****`。
    /// 2. `Partial` 取首尾字符，`Tail` 取末尾四个字符 (按 char 计数，避免截断多字节字符)。
    ///
    /// # Arguments
    /// * `value` - 原始敏感值。
    ///
    /// # Returns
    /// * 脱敏后的字符串。
    pub fn mask(&self, value: &str) -> String {
        match self {
            PrivacyMode::Secret => "****".to_string(),
            PrivacyMode::Partial => {
                let mut chars = value.chars();
                let first = chars.next().map(String::from).unwrap_or_default();
                let last = chars.next_back().map(String::from).unwrap_or_default();
                format!("{}...{}", first, last)
            }
            PrivacyMode::Tail => {
                let count = value.chars().count();
                let tail: String = value.chars().skip(count.saturating_sub(4)).collect();
                format!("...{}", tail)
            }
        }
    }
}

/// # Summary
/// 单次发送的结果。
///
/// # Invariants
/// - `success` 为唯一的判定依据，不存在部分成功。
/// - `status` 仅在收到 HTTP 响应时存在；传输层故障或未发起请求时为 `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub success: bool,
    pub status: Option<u16>,
    pub detail: String,
}

impl NotificationOutcome {
    /// # Summary
    /// 构造成功结果。
    pub fn delivered(status: u16, detail: impl Into<String>) -> Self {
        Self {
            success: true,
            status: Some(status),
            detail: detail.into(),
        }
    }

    /// # Summary
    /// 构造携带 HTTP 状态码的失败结果。
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            status: Some(status),
            detail: detail.into(),
        }
    }

    /// # Summary
    /// 构造未收到 HTTP 响应的失败结果 (无目标、连接失败、超时)。
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            detail: detail.into(),
        }
    }
}
