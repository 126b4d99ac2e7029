//! Duration strings such as `"30s"`, `"1m"`, `"2m30s"` or `"500ms"`.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use crate::errors::ConfigError;

fn whole_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d+(?:\.\d+)?(?:ms|h|m|s))+$").expect("duration pattern is valid")
    })
}

fn part_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)(ms|h|m|s)").expect("duration part pattern is valid")
    })
}

/// Parses a duration string made of `<number><unit>` parts.
///
/// Units are `h`, `m`, `s` and `ms`; parts add up (`"1m30s"` is 90 seconds).
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let trimmed = text.trim();
    if !whole_pattern().is_match(trimmed) {
        return Err(ConfigError::InvalidDuration(text.to_string()));
    }

    let mut total = 0.0_f64;
    for part in part_pattern().captures_iter(trimmed) {
        let amount: f64 = part[1]
            .parse()
            .map_err(|_| ConfigError::InvalidDuration(text.to_string()))?;
        let scale = match &part[2] {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            _ => 0.001,
        };
        total += amount * scale;
    }

    Duration::try_from_secs_f64(total).map_err(|_| ConfigError::InvalidDuration(text.to_string()))
}

/// Formats a duration in the same notation, e.g. `"2m30s"`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }

    let mut secs = duration.as_secs();
    let mut out = String::new();
    for (unit, size) in [("h", 3600), ("m", 60), ("s", 1)] {
        if secs >= size {
            out.push_str(&format!("{}{unit}", secs / size));
            secs %= size;
        }
    }
    out
}

/// Serde adapter for duration strings.
pub mod serde_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes as a duration string.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    /// Deserializes from a duration string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
