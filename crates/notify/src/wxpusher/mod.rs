pub mod address;
pub mod content;
pub mod payload;
pub mod response;
pub mod target;

use crate::throttle::IntervalThrottle;
use async_trait::async_trait;
use payload::NotificationRequest;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use std::sync::{Arc, LazyLock, Once};
use std::time::Duration;
use target::Targets;
use tracing::{debug, warn};
use wxnotify_core::config::NotifyConfig;
use wxnotify_core::notify::entity::{Message, NotificationOutcome, NotifyFormat};
use wxnotify_core::notify::error::NotifyError;
use wxnotify_core::notify::port::{Notifier, Throttle};

/// Descriptive name of the service.
pub const SERVICE_NAME: &str = "WxPusher";
/// Provider home page.
pub const SERVICE_URL: &str = "https://wxpusher.zjiecode.com/";
/// Scheme of the canonical notification url.
pub const PROTOCOL: &str = "wxpusher";
/// Setup / help page.
pub const SETUP_URL: &str = "https://github.com/caronc/apprise/wiki/Notify_wxpusher";
/// Message endpoint.
pub const NOTIFY_URL: &str = "https://wxpusher.zjiecode.com/api/send/message";

#[allow(clippy::expect_used)]
static IS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^AT_[^\s]+$").expect("token pattern must compile"));

static CRYPTO_PROVIDER: Once = Once::new();

/// # Summary
/// Construction arguments, usually produced by `address::parse_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct WxPusherArgs {
    pub token: String,
    pub targets: Vec<String>,
    pub format: NotifyFormat,
    /// Per-url overrides of the shared `NotifyConfig`.
    pub verify_certificate: Option<bool>,
    pub connect_timeout_secs: Option<f64>,
    pub read_timeout_secs: Option<f64>,
}

impl WxPusherArgs {
    pub fn new(token: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            token: token.into(),
            targets,
            format: NotifyFormat::default(),
            verify_certificate: None,
            connect_timeout_secs: None,
            read_timeout_secs: None,
        }
    }
}

/// # Summary
/// A notifier implementation that sends messages via the WxPusher API.
///
/// # Invariants
/// * `token` matches `^AT_[^\s]+$` (case-insensitive).
/// * Targets are classified once in the constructor and never change.
/// * `send` performs at most one HTTP call and never returns an error.
pub struct WxPusher {
    /// The App token.
    token: String,
    /// Classified users, topics and rejected entries.
    targets: Targets,
    /// Default format of the message body.
    format: NotifyFormat,
    /// Effective transport settings (after url overrides).
    config: NotifyConfig,
    /// Where the POST goes.
    endpoint: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
    /// Gate awaited before every remote call.
    throttle: Arc<dyn Throttle>,
}

impl WxPusher {
    /// # Summary
    /// Creates a new `WxPusher`.
    ///
    /// # Logic
    /// 1. Validates the token; a bad token fails before any target is looked at.
    /// 2. Applies the url overrides on top of `config`.
    /// 3. Classifies the targets into users, topics and invalid entries.
    /// 4. Builds the HTTP client and an `IntervalThrottle` from the effective config.
    ///
    /// # Arguments
    /// * `args` - Token, raw targets, format and per-url overrides.
    /// * `config` - Shared transport defaults.
    ///
    /// # Returns
    /// * A new instance of `WxPusher` or `NotifyError::Config`.
    pub fn new(args: WxPusherArgs, config: &NotifyConfig) -> Result<Self, NotifyError> {
        let token = args.token.trim();
        if !IS_TOKEN.is_match(token) {
            let msg = "An invalid WxPusher App Token was specified.";
            warn!("{}", msg);
            return Err(NotifyError::Config(msg.to_string()));
        }

        let mut config = config.clone();
        if let Some(verify) = args.verify_certificate {
            config.verify_certificate = verify;
        }
        if let Some(cto) = args.connect_timeout_secs {
            config.connect_timeout_secs = cto;
        }
        if let Some(rto) = args.read_timeout_secs {
            config.read_timeout_secs = rto;
        }

        let targets = Targets::classify(&args.targets);
        let client = build_client(&config)?;
        let throttle = Arc::new(IntervalThrottle::new(Duration::from_millis(
            config.throttle_interval_ms,
        )));

        Ok(Self {
            token: token.to_string(),
            targets,
            format: args.format,
            config,
            endpoint: NOTIFY_URL.to_string(),
            client,
            throttle,
        })
    }

    /// # Summary
    /// Parses a `wxpusher://` url and builds the notifier from it.
    pub fn from_url(url: &str, config: &NotifyConfig) -> Result<Self, NotifyError> {
        Self::new(address::parse_url(url)?, config)
    }

    /// Points the notifier at a different endpoint (e.g. a local mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replaces the private throttle with a shared one.
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    pub fn format(&self) -> NotifyFormat {
        self.format
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// # Summary
    /// Number of units of work this notifier represents.
    ///
    /// # Returns
    /// * Users plus topics, but never less than 1.
    pub fn target_count(&self) -> usize {
        self.targets.deliverable().max(1)
    }
}

fn build_client(config: &NotifyConfig) -> Result<reqwest::Client, NotifyError> {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("A rustls crypto provider was already installed");
        }
    });

    let connect_timeout = Duration::try_from_secs_f64(config.connect_timeout_secs).map_err(|e| {
        NotifyError::Config(format!(
            "Invalid connect timeout ({}): {}",
            config.connect_timeout_secs, e
        ))
    })?;
    let read_timeout = Duration::try_from_secs_f64(config.read_timeout_secs).map_err(|e| {
        NotifyError::Config(format!(
            "Invalid read timeout ({}): {}",
            config.read_timeout_secs, e
        ))
    })?;

    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .danger_accept_invalid_certs(!config.verify_certificate)
        .build()
        .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl Notifier for WxPusher {
    /// # Summary
    /// Sends a notification to every classified user and topic in one call.
    ///
    /// # Logic
    /// 1. Fails fast, without any network call, when there is no user and no topic.
    /// 2. Builds the JSON payload; a format on the message overrides the notifier default.
    /// 3. Waits on the throttle, then POSTs once.
    /// 4. A transport fault (connect error, timeout) is a failure with no status.
    /// 5. Otherwise hands status and body to the response interpreter.
    ///
    /// # Arguments
    /// * `message` - Body, optional title and optional format.
    ///
    /// # Returns
    /// * The `NotificationOutcome`; never an error.
    async fn send(&self, message: &Message) -> NotificationOutcome {
        if self.targets.is_empty() {
            warn!("There were no WxPusher targets to notify");
            return NotificationOutcome::failed("There were no WxPusher targets to notify");
        }

        let request = NotificationRequest::build(&self.token, message, self.format, &self.targets);

        debug!(
            "WxPusher POST URL: {} (cert_verify={})",
            self.endpoint, self.config.verify_certificate
        );
        debug!("WxPusher Payload: {:?}", request);

        // Always honor the throttle before any remote i/o.
        self.throttle.wait().await;

        // The explicit charset header is kept; `json` only fills in a missing content type.
        let result = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .json(&request)
            .send()
            .await;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => return connection_failure(e),
        };

        let status = reply.status().as_u16();
        match reply.bytes().await {
            Ok(raw) => response::interpret(status, &raw, self.targets.deliverable()),
            Err(e) => connection_failure(e),
        }
    }
}

fn connection_failure(e: reqwest::Error) -> NotificationOutcome {
    warn!("A Connection error occurred sending WxPusher notification.");
    debug!("Socket Exception: {}", e);
    NotificationOutcome::failed(e.to_string())
}
