use crate::time::Duration;

/// How a [`Debouncer`](super::Debouncer) behaves.
///
/// With the `json` feature, a config deserializes from objects such as
/// `{"wait": 250, "immediate": true}`. `wait` is either a number of
/// milliseconds or a human-readable duration like `"1s 500ms"`. Missing
/// fields take their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, deny_unknown_fields))]
pub struct Config {
    /// The quiet period.
    #[cfg_attr(feature = "json", serde(with = "wait"))]
    pub wait: Duration,
    /// Fire on the leading edge of a burst instead of the trailing edge.
    pub immediate: bool,
}

impl Config {
    /// The wait used when none is given.
    pub const DEFAULT_WAIT: Duration = Duration::from_nanos(250_000_000);

    /// A trailing-edge config with the given quiet period.
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            immediate: false,
        }
    }

    /// Select leading-edge (`true`) or trailing-edge (`false`) firing.
    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Parse a wait from text: a bare number is taken as milliseconds,
    /// anything else goes through [`humantime::parse_duration`].
    ///
    /// Negative or NaN millisecond values become zero.
    ///
    /// ```
    /// use debounced::debounce::Config;
    /// use debounced::time::Duration;
    ///
    /// assert_eq!(Config::parse_wait("250").unwrap(), Duration::from_millis(250));
    /// assert_eq!(Config::parse_wait("1s 500ms").unwrap(), Duration::from_millis(1500));
    /// assert_eq!(Config::parse_wait("-5").unwrap(), Duration::ZERO);
    /// assert!(Config::parse_wait("soon").is_err());
    /// ```
    pub fn parse_wait(input: &str) -> Result<Duration, ConfigError> {
        let input = input.trim();
        if let Ok(millis) = input.parse::<f64>() {
            return Ok(Duration::from_millis_f64(millis));
        }
        humantime::parse_duration(input)
            .map(Duration::from)
            .map_err(|source| ConfigError::InvalidWait {
                input: input.to_owned(),
                source,
            })
    }

    /// Load a config from a JSON document.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(json)?;
        tracing::debug!(?config, "loaded debounce config");
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WAIT)
    }
}

/// Errors raised while building a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The wait was neither a number nor a duration `humantime` understands.
    #[error("invalid wait duration {input:?}")]
    InvalidWait {
        /// The rejected text.
        input: String,
        /// Why `humantime` rejected it.
        #[source]
        source: humantime::DurationError,
    },
    /// The JSON document was malformed or had the wrong shape.
    #[cfg(feature = "json")]
    #[error("invalid debounce config")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "json")]
mod wait {
    use super::Config;
    use crate::time::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wait {
        Millis(f64),
        Text(String),
    }

    pub(super) fn serialize<S>(wait: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let std: std::time::Duration = (*wait).into();
        serializer.collect_str(&humantime::format_duration(std))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Wait::deserialize(deserializer)? {
            Wait::Millis(millis) => Ok(Duration::from_millis_f64(millis)),
            Wait::Text(text) => Config::parse_wait(&text).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_classic_timeout() {
        let config = Config::default();
        assert_eq!(config.wait, Duration::from_millis(250));
        assert!(!config.immediate);
        assert!(Config::new(Duration::ZERO).immediate(true).immediate);
    }

    #[test]
    fn parse_wait_reports_the_input() {
        let err = Config::parse_wait("  later ").unwrap_err();
        assert_eq!(err.to_string(), r#"invalid wait duration "later""#);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(Config::parse_wait("NaN").unwrap(), Duration::ZERO);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_accepts_numbers_and_text() -> anyhow::Result<()> {
        let config = Config::from_json(r#"{"wait": 20, "immediate": true}"#)?;
        assert_eq!(config, Config::new(Duration::from_millis(20)).immediate(true));

        let config = Config::from_json(r#"{"wait": "1s 5ms"}"#)?;
        assert_eq!(config.wait, Duration::from_millis(1005));
        assert!(!config.immediate);

        let config = Config::from_json(r#"{"wait": -3}"#)?;
        assert_eq!(config.wait, Duration::ZERO);

        assert_eq!(Config::from_json("{}")?, Config::default());
        Ok(())
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_rejects_bad_documents() {
        assert!(matches!(
            Config::from_json(r#"{"wait": "whenever"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(Config::from_json(r#"{"timeout": 10}"#).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_writes_readable_waits() -> anyhow::Result<()> {
        let json = serde_json::to_string(&Config::new(Duration::from_millis(1500)))?;
        assert_eq!(json, r#"{"wait":"1s 500ms","immediate":false}"#);
        assert_eq!(Config::from_json(&json)?.wait, Duration::from_millis(1500));
        Ok(())
    }
}
