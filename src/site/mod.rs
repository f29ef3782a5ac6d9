//! Site subsystem.
//!
//! # Data Flow
//! ```text
//! SiteConfig
//!     → Site (base URL, languages, enhancer configuration)
//!     → PageRouter (one router per site)
//!
//! PageRouter
//!     → finder.rs (slug candidates → page rows)
//! ```
//!
//! # Design Decisions
//! - A site is an immutable snapshot for the lifetime of a routing operation
//! - Site dispatch (which site serves a host) happens before routing
//! - Page storage is behind the `PageFinder` trait

pub mod finder;
pub mod language;
pub mod page;

use url::Url;

use crate::config::schema::{EnhancerConfig, SiteConfig};
use crate::routing::types::{RoutingError, RoutingResult};

pub use finder::{InMemoryPageFinder, PageFinder};
pub use language::SiteLanguage;
pub use page::PageRecord;

/// The root of a routed page tree.
#[derive(Debug, Clone)]
pub struct Site {
    identifier: String,
    root_page_id: u32,
    base: Url,
    languages: Vec<SiteLanguage>,
    route_enhancers: Vec<EnhancerConfig>,
}

impl Site {
    /// Build a site from its configuration.
    pub fn from_config(config: &SiteConfig) -> RoutingResult<Self> {
        let base = Url::parse(&config.base)
            .map_err(|e| RoutingError::InvalidSite(format!("base '{}': {}", config.base, e)))?;

        let languages = config
            .languages
            .iter()
            .map(|language| SiteLanguage::from_config(language, &base))
            .collect::<RoutingResult<Vec<_>>>()?;

        if languages.is_empty() {
            return Err(RoutingError::InvalidSite("no languages configured".into()));
        }

        Ok(Self {
            identifier: config.identifier.clone(),
            root_page_id: config.root_page_id,
            base,
            languages,
            route_enhancers: config.route_enhancers.clone(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn root_page_id(&self) -> u32 {
        self.root_page_id
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn languages(&self) -> &[SiteLanguage] {
        &self.languages
    }

    pub fn route_enhancers(&self) -> &[EnhancerConfig] {
        &self.route_enhancers
    }

    /// The default language (id 0, or the first configured one).
    pub fn default_language(&self) -> &SiteLanguage {
        self.languages
            .iter()
            .find(|l| l.language_id() == 0)
            .unwrap_or(&self.languages[0])
    }

    /// Look up a configured language.
    pub fn language_by_id(&self, language_id: u32) -> RoutingResult<&SiteLanguage> {
        self.languages
            .iter()
            .find(|l| l.language_id() == language_id)
            .ok_or(RoutingError::UnknownLanguage(language_id))
    }
}
