use crate::wxpusher::target::parse_list;
use crate::wxpusher::{PROTOCOL, WxPusher, WxPusherArgs};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::warn;
use url::{Url, form_urlencoded};
use wxnotify_core::config::NotifyConfig;
use wxnotify_core::notify::entity::{NotifyFormat, PrivacyMode};
use wxnotify_core::notify::error::NotifyError;

// Everything but unreserved characters is escaped inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// # Summary
/// Parses `wxpusher://{token}/{targets}/?{params}` into construction arguments.
///
/// # Logic
/// 1. Checks the scheme.
/// 2. Percent-decodes every non-empty path segment into one target each.
/// 3. Appends the `to` query value, split by `parse_list`, after the path targets.
/// 4. Takes the token from the `token` query value when non-empty, otherwise from the host.
/// 5. Reads `format`, `verify`, `cto` and `rto`.
///
/// # Arguments
/// * `raw` - The notification url.
///
/// # Returns
/// * `WxPusherArgs` or `NotifyError::InvalidUrl`. The token itself is validated later by
///   `WxPusher::new`.
pub fn parse_url(raw: &str) -> Result<WxPusherArgs, NotifyError> {
    let url = Url::parse(raw.trim()).map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
    if url.scheme() != PROTOCOL {
        return Err(NotifyError::InvalidUrl(format!(
            "unsupported scheme '{}', expected '{}'",
            url.scheme(),
            PROTOCOL
        )));
    }

    let mut targets: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(decode)
                .collect()
        })
        .unwrap_or_default();

    let mut args = WxPusherArgs::new(String::new(), Vec::new());
    let mut query_token = None;
    let mut to = Vec::new();

    for (key, value) in url.query_pairs() {
        match key.to_lowercase().as_str() {
            "to" => to.push(value.into_owned()),
            "token" if !value.is_empty() => query_token = Some(value.into_owned()),
            "format" => {
                args.format = value
                    .parse::<NotifyFormat>()
                    .map_err(NotifyError::InvalidUrl)?;
            }
            "verify" => args.verify_certificate = Some(parse_bool(&value, true)),
            "cto" => args.connect_timeout_secs = parse_secs("cto", &value),
            "rto" => args.read_timeout_secs = parse_secs("rto", &value),
            _ => {}
        }
    }

    targets.extend(parse_list(&to));
    args.targets = targets;

    args.token = match query_token {
        Some(token) => token,
        None => url.host_str().map(decode).unwrap_or_default(),
    };
    if args.token.is_empty() {
        return Err(NotifyError::InvalidUrl("no WxPusher App Token was specified".into()));
    }

    Ok(args)
}

impl WxPusher {
    /// # Summary
    /// Rebuilds the canonical url for this notifier.
    ///
    /// # Logic
    /// 1. Renders the token verbatim, or masked when a privacy mode is given.
    /// 2. Lists topics, then users, then percent-encoded invalid entries as path segments.
    /// 3. Appends `format` and `verify`, plus `cto`/`rto` when they differ from the defaults.
    ///
    /// # Arguments
    /// * `privacy` - `None` to reveal the token, `Some(mode)` to mask it.
    ///
    /// # Returns
    /// * The url; without privacy it parses back into identical target buckets.
    pub fn url(&self, privacy: Option<PrivacyMode>) -> String {
        let token = match privacy {
            Some(mode) => mode.mask(self.token()),
            None => encode(self.token()),
        };

        let targets = self.targets();
        let path = targets
            .topics()
            .iter()
            .map(|t| t.to_string())
            .chain(targets.users().iter().map(|u| encode(u)))
            .chain(targets.invalid_targets().iter().map(|x| encode(x)))
            .collect::<Vec<_>>()
            .join("/");

        let config = self.config();
        let defaults = NotifyConfig::default();
        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("format", &self.format().to_string());
        params.append_pair("verify", if config.verify_certificate { "yes" } else { "no" });
        if config.connect_timeout_secs != defaults.connect_timeout_secs {
            params.append_pair("cto", &config.connect_timeout_secs.to_string());
        }
        if config.read_timeout_secs != defaults.read_timeout_secs {
            params.append_pair("rto", &config.read_timeout_secs.to_string());
        }

        format!(
            "{}://{}/{}{}?{}",
            PROTOCOL,
            token,
            path,
            if path.is_empty() { "" } else { "/" },
            params.finish()
        )
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "on" | "enable" => true,
        "no" | "n" | "false" | "0" | "off" | "disable" => false,
        _ => default,
    }
}

fn parse_secs(name: &str, value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs),
        _ => {
            warn!("Ignoring invalid {} timeout ({}).", name, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_and_path() {
        let args = parse_url("wxpusher://AT_appid/123/UID_abcd/bad%20target/").unwrap();
        assert_eq!(args.token, "AT_appid");
        assert_eq!(args.targets, ["123", "UID_abcd", "bad target"]);
        assert_eq!(args.format, NotifyFormat::Text);
        assert_eq!(args.verify_certificate, None);
    }

    #[test]
    fn test_parse_query_token_and_to() {
        let args = parse_url("wxpusher://AT_host/1?token=AT_query&to=UID_a,2%203").unwrap();
        assert_eq!(args.token, "AT_query");
        assert_eq!(args.targets, ["1", "UID_a", "2", "3"]);

        // an empty token value does not override the host
        let args = parse_url("wxpusher://AT_host/1?token=").unwrap();
        assert_eq!(args.token, "AT_host");
    }

    #[test]
    fn test_parse_params() {
        let args = parse_url("wxpusher://AT_x/1?format=markdown&verify=no&cto=2.5&rto=abc").unwrap();
        assert_eq!(args.format, NotifyFormat::Markdown);
        assert_eq!(args.verify_certificate, Some(false));
        assert_eq!(args.connect_timeout_secs, Some(2.5));
        assert_eq!(args.read_timeout_secs, None);
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        assert!(matches!(parse_url("https://AT_x/1"), Err(NotifyError::InvalidUrl(_))));
        assert!(matches!(parse_url("not a url"), Err(NotifyError::InvalidUrl(_))));
        assert!(matches!(parse_url("wxpusher://AT_x/1?format=rtf"), Err(NotifyError::InvalidUrl(_))));
        assert!(matches!(parse_url("wxpusher:///1/2"), Err(NotifyError::InvalidUrl(_))));
    }

    fn notifier(url: &str) -> WxPusher {
        WxPusher::from_url(url, &NotifyConfig::default()).unwrap()
    }

    #[test]
    fn test_url_layout() {
        let n = notifier("wxpusher://AT_appid/UID_abc123/77/bad%20target/007");
        assert_eq!(
            n.url(None),
            "wxpusher://AT_appid/77/UID_abc123/bad%20target/007/?format=text&verify=yes"
        );

        let n = notifier("wxpusher://AT_appid?format=html&verify=no&rto=10");
        assert_eq!(n.url(None), "wxpusher://AT_appid/?format=html&verify=no&rto=10");
    }

    #[test]
    fn test_url_privacy() {
        let n = notifier("wxpusher://AT_secret123/1");
        assert_eq!(n.url(Some(PrivacyMode::Secret)), "wxpusher://****/1/?format=text&verify=yes");
        assert_eq!(n.url(Some(PrivacyMode::Partial)), "wxpusher://A...3/1/?format=text&verify=yes");
        assert!(!n.url(Some(PrivacyMode::Tail)).contains("AT_secret123"));
    }

    #[test]
    fn test_round_trip_preserves_buckets() {
        let original = WxPusher::new(
            WxPusherArgs::new(
                "AT_appid",
                ["UID_b", "9", "UID_a", "bad target", "007", "a/b?c", "9", "中文"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            &NotifyConfig::default(),
        )
        .unwrap();

        let rebuilt = notifier(&original.url(None));
        assert_eq!(rebuilt.token(), original.token());
        assert_eq!(rebuilt.targets(), original.targets());
        assert_eq!(rebuilt.format(), original.format());
        assert_eq!(rebuilt.url(None), original.url(None));
    }
}
