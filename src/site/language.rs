//! Site languages.

use url::Url;

use crate::config::schema::LanguageConfig;
use crate::routing::types::{RoutingError, RoutingResult};

/// A language of a site together with its resolved base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLanguage {
    language_id: u32,
    base: Url,
    locale: String,
    title: String,
}

impl SiteLanguage {
    /// Create a language with an absolute base URL.
    pub fn new(language_id: u32, base: Url, locale: impl Into<String>) -> Self {
        Self {
            language_id,
            base,
            locale: locale.into(),
            title: String::new(),
        }
    }

    /// Build a language from configuration, resolving a relative base
    /// against the site base.
    pub fn from_config(config: &LanguageConfig, site_base: &Url) -> RoutingResult<Self> {
        let base = site_base.join(&config.base).map_err(|e| {
            RoutingError::InvalidSite(format!(
                "language {} base '{}': {}",
                config.language_id, config.base, e
            ))
        })?;

        Ok(Self {
            language_id: config.language_id,
            base,
            locale: config.locale.clone(),
            title: config.title.clone(),
        })
    }

    pub fn language_id(&self) -> u32 {
        self.language_id
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Base path without trailing slash; generated paths start with `/`.
    pub fn path_prefix(&self) -> &str {
        self.base.path().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_base_is_resolved() {
        let site_base = Url::parse("https://example.com/").unwrap();
        let config = LanguageConfig {
            language_id: 1,
            base: "/de/".into(),
            locale: "de_DE.UTF-8".into(),
            title: "Deutsch".into(),
        };

        let language = SiteLanguage::from_config(&config, &site_base).unwrap();
        assert_eq!(language.base().as_str(), "https://example.com/de/");
        assert_eq!(language.path_prefix(), "/de");
        assert_eq!(language.locale(), "de_DE.UTF-8");
    }

    #[test]
    fn test_absolute_base_wins() {
        let site_base = Url::parse("https://example.com/").unwrap();
        let config = LanguageConfig {
            base: "https://example.fr:8443/".into(),
            ..LanguageConfig::default()
        };

        let language = SiteLanguage::from_config(&config, &site_base).unwrap();
        assert_eq!(language.base().host_str(), Some("example.fr"));
        assert_eq!(language.base().port(), Some(8443));
        assert_eq!(language.path_prefix(), "");
    }
}
