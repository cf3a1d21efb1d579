use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// Users always start with UID_ (prefix is case-insensitive).
#[allow(clippy::expect_used)]
static IS_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<full>(?i:UID_)[^\s]+)\s*$").expect("user pattern must compile")
});

// Topics are always numerical, no leading zero.
#[allow(clippy::expect_used)]
static IS_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<topic>[1-9][0-9]{0,20})\s*$").expect("topic pattern must compile")
});

// Separators accepted inside one compound target string.
#[allow(clippy::expect_used)]
static LIST_DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,/\\]+").expect("delimiter pattern must compile"));

/// # Summary
/// A single classified destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Individual subscriber, stored as the full `UID_...` token.
    User(String),
    /// Broadcast channel id.
    Topic(u128),
    /// Anything else, kept verbatim for diagnostics only.
    Invalid(String),
}

impl Target {
    /// # Summary
    /// Classifies one raw destination string.
    ///
    /// # Logic
    /// 1. Tries the user pattern first; the matched token keeps its original casing.
    /// 2. Falls back to the topic pattern and stores the integer value.
    /// 3. Everything else becomes `Invalid`.
    ///
    /// # Arguments
    /// * `raw` - The destination as supplied by the caller.
    ///
    /// # Returns
    /// * The classified `Target`.
    pub fn classify(raw: &str) -> Self {
        if let Some(full) = IS_USER.captures(raw).and_then(|c| c.name("full")) {
            return Target::User(full.as_str().to_string());
        }

        // 21 digits always fit in a u128.
        if let Some(topic) = IS_TOPIC
            .captures(raw)
            .and_then(|c| c.name("topic"))
            .and_then(|m| m.as_str().parse::<u128>().ok())
        {
            return Target::Topic(topic);
        }

        Target::Invalid(raw.to_string())
    }
}

/// # Summary
/// The three target buckets produced once at construction time.
///
/// # Invariants
/// - Insertion order is preserved in every bucket.
/// - Duplicates are kept; de-duplication belongs to `parse_list`.
/// - Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    users: Vec<String>,
    topics: Vec<u128>,
    invalid: Vec<String>,
}

impl Targets {
    /// # Summary
    /// Classifies every raw target independently.
    ///
    /// # Logic
    /// A bad entry is logged at warning level and recorded as invalid; it never aborts the
    /// classification of the remaining entries.
    pub fn classify<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets = Targets::default();
        for entry in raw {
            match Target::classify(entry.as_ref()) {
                Target::User(user) => targets.users.push(user),
                Target::Topic(topic) => targets.topics.push(topic),
                Target::Invalid(invalid) => {
                    warn!("Dropped invalid WxPusher user/topic ({}) specified.", invalid);
                    targets.invalid.push(invalid);
                }
            }
        }
        targets
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn topics(&self) -> &[u128] {
        &self.topics
    }

    pub fn invalid_targets(&self) -> &[String] {
        &self.invalid
    }

    /// Number of targets the provider will actually be asked to notify.
    pub fn deliverable(&self) -> usize {
        self.users.len() + self.topics.len()
    }

    /// True when there is no user and no topic, regardless of invalid entries.
    pub fn is_empty(&self) -> bool {
        self.deliverable() == 0
    }
}

/// # Summary
/// Splits compound target strings into individual entries.
///
/// # Logic
/// 1. Splits each input on whitespace, commas and slashes.
/// 2. Drops empty fragments.
/// 3. Removes exact duplicates, keeping the first occurrence.
///
/// # Arguments
/// * `raw` - One or more compound strings (e.g. `"UID_a, 12 34"`).
///
/// # Returns
/// * The flattened, de-duplicated list in first-seen order.
pub fn parse_list<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for compound in raw {
        for piece in LIST_DELIMITERS.split(compound.as_ref()) {
            if !piece.is_empty() && !out.iter().any(|seen| seen == piece) {
                out.push(piece.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_users_any_prefix_case() {
        assert_eq!(Target::classify("UID_abc123"), Target::User("UID_abc123".into()));
        assert_eq!(Target::classify("uid_AbC"), Target::User("uid_AbC".into()));
        assert_eq!(Target::classify("  Uid_x-y.z  "), Target::User("Uid_x-y.z".into()));
        // prefix without a body is not a user
        assert_eq!(Target::classify("UID_"), Target::Invalid("UID_".into()));
        assert_eq!(Target::classify("UID_a b"), Target::Invalid("UID_a b".into()));
    }

    #[test]
    fn test_classify_topics() {
        assert_eq!(Target::classify("77"), Target::Topic(77));
        assert_eq!(Target::classify(" 1 "), Target::Topic(1));
        let max = "9".repeat(21);
        assert_eq!(Target::classify(&max), Target::Topic(max.parse().unwrap()));
        // 22 digits exceed the syntactic cap
        let too_long = "1".repeat(22);
        assert_eq!(Target::classify(&too_long), Target::Invalid(too_long.clone()));
    }

    #[test]
    fn test_classify_invalid() {
        for raw in ["", "0", "007", "0123", "-5", "12a", "bad target", "AT_token"] {
            assert_eq!(Target::classify(raw), Target::Invalid(raw.to_string()), "{raw}");
        }
    }

    #[test]
    fn test_buckets_preserve_order_and_duplicates() {
        let targets = Targets::classify(["UID_abc123", "77", "bad target", "007"]);
        assert_eq!(targets.users(), ["UID_abc123".to_string()]);
        assert_eq!(targets.topics(), [77]);
        assert_eq!(targets.invalid_targets(), ["bad target".to_string(), "007".to_string()]);

        let targets = Targets::classify(["5", "UID_b", "3", "5", "UID_a"]);
        assert_eq!(targets.topics(), [5, 3, 5]);
        assert_eq!(targets.users(), ["UID_b".to_string(), "UID_a".to_string()]);
        assert_eq!(targets.deliverable(), 5);
    }

    #[test]
    fn test_only_invalid_is_empty() {
        let targets = Targets::classify(["nope", "0"]);
        assert!(targets.is_empty());
        assert_eq!(targets.invalid_targets().len(), 2);
        assert!(Targets::classify(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_parse_list() {
        let list = parse_list(["UID_a, 12 34", "12/UID_b", "  "]);
        assert_eq!(list, ["UID_a", "12", "34", "UID_b"]);
    }
}
