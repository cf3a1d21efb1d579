use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wxnotify_core::config::AppConfig;
use wxnotify_core::notify::entity::{Message, NotifyFormat, PrivacyMode};
use wxnotify_core::notify::port::Notifier;
use wxnotify_notify::wxpusher::{SERVICE_NAME, SERVICE_URL, SETUP_URL, WxPusher};

/// 通过 WxPusher 发送一条通知。
#[derive(Parser, Debug)]
#[command(
    name = "wxnotify",
    version,
    after_help = format!("{}: {}\nSetup: {}", SERVICE_NAME, SERVICE_URL, SETUP_URL)
)]
struct Cli {
    /// 消息正文
    body: String,

    /// 消息标题 (WxPusher summary)
    #[arg(short, long)]
    title: Option<String>,

    /// 正文格式 (text / markdown / html)，缺省时使用通知地址中的 `format`
    #[arg(short, long)]
    format: Option<NotifyFormat>,

    /// 通知地址，覆盖配置文件与环境变量中的 `url`
    #[arg(short, long)]
    url: Option<String>,

    /// 配置文件路径 (不含扩展名)
    #[arg(short, long, default_value = "wxnotify")]
    config: String,
}

/// # Summary
/// 加载分层配置。
///
/// # Logic
/// 1. 读取可选的配置文件 (toml / yaml / json 均可)。
/// 2. 叠加 `WXNOTIFY_` 前缀的环境变量，嵌套字段以 `__` 分隔。
///
/// # Arguments
/// * `path` - 配置文件路径 (不含扩展名)。
///
/// # Returns
/// * 反序列化后的 `AppConfig`。
fn load_config(path: &str) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("WXNOTIFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 命令行入口。
///
/// # Logic
/// 1. 初始化全局日志 (`RUST_LOG`，默认 info)。
/// 2. 加载配置，命令行 `--url` 优先。
/// 3. 由通知地址构造 WxPusher 并发送一次。
/// 4. 发送失败时以非零状态退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // 2. 加载配置
    let app = load_config(&cli.config)?;
    let url = cli.url.unwrap_or(app.url);
    if url.is_empty() {
        return Err("no notification url configured (use --url or WXNOTIFY_URL)".into());
    }

    // 3. 构造通知器
    let notifier = WxPusher::from_url(&url, &app.notify)?;
    info!(
        "Notifying {} via {} ({} targets)",
        SERVICE_NAME,
        notifier.url(Some(PrivacyMode::Secret)),
        notifier.target_count()
    );

    let mut message = Message::new(cli.body);
    if let Some(title) = cli.title {
        message = message.with_title(title);
    }
    if let Some(format) = cli.format {
        message = message.with_format(format);
    }

    // 4. 发送
    let outcome = notifier.send(&message).await;
    if !outcome.success {
        warn!("Notification failed: {}", outcome.detail);
        return Err(format!("notification failed: {}", outcome.detail).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_names_the_service() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains(SERVICE_NAME));
        assert!(help.contains(SERVICE_URL));
        assert!(help.contains(SETUP_URL));
    }

    #[test]
    fn test_cli_parses_title_and_url() {
        let cli = Cli::parse_from(["wxnotify", "hello", "-t", "greeting", "--url", "wxpusher://AT_x/1"]);
        assert_eq!(cli.body, "hello");
        assert_eq!(cli.title.as_deref(), Some("greeting"));
        assert_eq!(cli.url.as_deref(), Some("wxpusher://AT_x/1"));
        assert_eq!(cli.config, "wxnotify");
        assert_eq!(cli.format, None);

        let cli = Cli::parse_from(["wxnotify", "*hi*", "--format", "markdown"]);
        assert_eq!(cli.format, Some(NotifyFormat::Markdown));
        assert!(Cli::try_parse_from(["wxnotify", "hi", "--format", "rtf"]).is_err());
    }
}
