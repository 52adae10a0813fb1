use crate::PreviewError;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use url::Url;

/// Pattern name used when no patterns are configured.
pub const DEFAULT_PATTERN_KEY: &str = "link";

const DEFAULT_LINK_PATTERN: &str = r"https?://\S+";

/// Tool configuration as supplied by the host editor.
///
/// `plugin_endpoints` and `endpoints_paste_regex` are accepted for
/// multi-source routing but are not consulted by any transition yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockConfig {
    pub endpoint: String,
    pub plugin_endpoints: HashMap<String, String>,
    pub endpoints_paste_regex: HashMap<String, String>,
    pub paste_patterns: BTreeMap<String, String>,
}

impl BlockConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, PreviewError> {
        serde_json::from_value(value).map_err(|e| PreviewError::ConfigError(e.to_string()))
    }

    pub fn with_plugin_endpoint(
        mut self,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        self.plugin_endpoints.insert(name.into(), endpoint.into());
        self
    }

    pub fn with_endpoint_paste_regex(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.endpoints_paste_regex
            .insert(name.into(), pattern.into());
        self
    }

    pub fn with_paste_pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.paste_patterns.insert(name.into(), pattern.into());
        self
    }

    /// Checks the endpoint is an absolute URL and that every configured
    /// regex compiles.
    pub fn validate(&self) -> Result<(), PreviewError> {
        let endpoint = Url::parse(&self.endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(PreviewError::ConfigError(format!(
                "endpoint is not a base URL: {}",
                self.endpoint
            )));
        }

        for pattern in self
            .endpoints_paste_regex
            .values()
            .chain(self.paste_patterns.values())
        {
            Regex::new(pattern).map_err(|e| PreviewError::InvalidPattern(e.to_string()))?;
        }

        Ok(())
    }

    pub fn paste_config(&self) -> Result<PasteConfig, PreviewError> {
        if self.paste_patterns.is_empty() {
            return Ok(PasteConfig::default());
        }

        let mut config = PasteConfig::empty();
        for (name, pattern) in &self.paste_patterns {
            config = config.with_pattern(name, pattern)?;
        }
        Ok(config)
    }
}

/// URL patterns this block claims from host paste events.
#[derive(Debug, Clone)]
pub struct PasteConfig {
    patterns: Vec<(String, Regex)>,
}

impl Default for PasteConfig {
    fn default() -> Self {
        let pattern = anchored(DEFAULT_LINK_PATTERN)
            .map(|regex| vec![(DEFAULT_PATTERN_KEY.to_string(), regex)])
            .unwrap_or_default();
        Self { patterns: pattern }
    }
}

impl PasteConfig {
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Adds a pattern. It has to match the whole pasted text, not a part of it.
    pub fn with_pattern(mut self, name: &str, pattern: &str) -> Result<Self, PreviewError> {
        let regex = anchored(pattern)?;
        debug!(name = %name, pattern = %pattern, "Registered paste pattern");
        self.patterns.push((name.to_string(), regex));
        Ok(self)
    }

    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns
            .iter()
            .map(|(name, regex)| (name.as_str(), regex.as_str()))
    }

    pub fn matching_key(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| name.as_str())
    }

    pub fn claims(&self, text: &str) -> bool {
        self.matching_key(text).is_some()
    }
}

fn anchored(pattern: &str) -> Result<Regex, PreviewError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| PreviewError::InvalidPattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_host_config() {
        let config = BlockConfig::from_json(json!({
            "endpoint": "https://api.example.com/fetchUrl",
            "pluginEndpoints": { "shop": "https://shop.example.com/meta" },
            "endpointsPasteRegex": { "shop": "https://shop\\.example\\.com/.*" }
        }))
        .unwrap();

        assert_eq!(config.endpoint, "https://api.example.com/fetchUrl");
        assert_eq!(
            config.plugin_endpoints.get("shop").map(String::as_str),
            Some("https://shop.example.com/meta")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = BlockConfig::from_json(json!({})).unwrap();
        assert_eq!(config.endpoint, "");
        assert!(config.plugin_endpoints.is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_regex() {
        let config = BlockConfig::new("https://api.example.com")
            .with_endpoint_paste_regex("broken", "([a-z");
        assert!(matches!(
            config.validate(),
            Err(PreviewError::InvalidPattern(_))
        ));
    }

    #[test]
    fn rejects_non_base_endpoint() {
        let config = BlockConfig::new("mailto:someone@example.com");
        assert!(matches!(config.validate(), Err(PreviewError::ConfigError(_))));
    }

    #[test]
    fn default_paste_config_claims_http_links() {
        let paste = PasteConfig::default();

        assert_eq!(paste.matching_key("https://example.com/a?b=1"), Some("link"));
        assert!(paste.claims("  http://example.com  "));
        assert!(!paste.claims("see https://example.com"));
        assert!(!paste.claims("ftp://example.com"));
    }

    #[test]
    fn configured_patterns_replace_default() {
        let paste = BlockConfig::new("https://api.example.com")
            .with_paste_pattern("product", r"https?://(?:www\.)?shop\.com/product/.*")
            .paste_config()
            .unwrap();

        assert_eq!(
            paste.matching_key("https://www.shop.com/product/42"),
            Some("product")
        );
        assert!(!paste.claims("https://example.com"));
    }
}
