//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::site::page::PageRecord;

/// Root configuration for the page router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// The site whose page tree is routed.
    pub site: SiteConfig,

    /// Cache hash settings.
    pub cache_hash: CacheHashConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Page rows served by the in-memory page finder.
    pub pages: Vec<PageRecord>,

    /// Alias rows served by the in-memory alias store.
    pub aliases: Vec<AliasRecord>,
}

/// Site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site identifier for logging.
    pub identifier: String,

    /// Uid of the page at the root of this site's tree.
    pub root_page_id: u32,

    /// Absolute base URL (e.g., "https://example.com/").
    pub base: String,

    /// Configured languages. The first entry with id 0 is the default.
    pub languages: Vec<LanguageConfig>,

    /// Route enhancers applied to the pages of this site, in order.
    pub route_enhancers: Vec<EnhancerConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            identifier: "main".to_string(),
            root_page_id: 1,
            base: "http://localhost/".to_string(),
            languages: vec![LanguageConfig::default()],
            route_enhancers: Vec::new(),
        }
    }
}

/// Site language configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language id (0 = default language).
    pub language_id: u32,

    /// Base URL, absolute or relative to the site base (e.g., "/de/").
    pub base: String,

    /// Locale (e.g., "de_DE.UTF-8"), used by locale-aware aspects.
    pub locale: String,

    /// Human readable title.
    pub title: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            language_id: 0,
            base: "/".to_string(),
            locale: "en_US.UTF-8".to_string(),
            title: "English".to_string(),
        }
    }
}

/// Route enhancer configuration.
///
/// Fields are shared by all enhancer types; each type reads the subset it
/// needs and validation checks the required ones are present.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Unique enhancer name, used in route names.
    pub name: String,

    /// Enhancer type ("Simple", "Plugin", "PageType" or a registered custom type).
    #[serde(rename = "type")]
    pub enhancer_type: String,

    /// Route path appended to the page slug (e.g., "/{news}/{page}").
    pub route_path: Option<String>,

    /// Parameter namespace for plugin enhancers (e.g., "tx_news").
    pub namespace: Option<String>,

    /// Default values for route variables.
    pub defaults: BTreeMap<String, String>,

    /// Regex requirements for route variables.
    pub requirements: BTreeMap<String, String>,

    /// Route variable name -> argument name.
    pub arguments: BTreeMap<String, String>,

    /// Restrict this enhancer to the given (default language) page ids.
    pub limit_to_pages: Option<Vec<u32>>,

    /// Aspects bound to route variables.
    pub aspects: BTreeMap<String, AspectConfig>,

    /// Page type decorator: suffix used when no mapped type is requested.
    pub default: Option<String>,

    /// Page type decorator: name used for the root page when a suffix applies.
    pub index: Option<String>,

    /// Page type decorator: suffix -> type value.
    pub map: BTreeMap<String, String>,
}

/// Aspect configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AspectConfig {
    /// Aspect type ("StaticRangeMapper", "StaticValueMapper",
    /// "PersistedAliasMapper" or a registered custom type).
    #[serde(rename = "type")]
    pub aspect_type: String,

    /// Range start (inclusive).
    pub start: Option<String>,

    /// Range end (inclusive).
    pub end: Option<String>,

    /// Raw path value -> parameter value.
    pub map: BTreeMap<String, String>,

    /// Locale specific replacements for `map`.
    pub locale_map: Vec<LocaleMapConfig>,

    /// Alias table to look values up in.
    pub table_name: Option<String>,

    /// Alias field holding the path value.
    pub route_field_name: Option<String>,
}

/// Locale specific value map.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LocaleMapConfig {
    /// Locale prefix (e.g., "de_DE").
    pub locale: String,

    /// Raw path value -> parameter value.
    pub map: BTreeMap<String, String>,
}

/// Cache hash configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheHashConfig {
    /// Secret mixed into every hash.
    pub encryption_key: String,

    /// Parameters never taken into account.
    pub excluded_parameters: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A persisted record that can be addressed by alias.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AliasRecord {
    /// Table the record belongs to.
    pub table_name: String,

    /// Record uid (the parameter value).
    pub uid: u32,

    /// Language of this row.
    #[serde(default)]
    pub language_id: u32,

    /// Field values, e.g. `path_segment = "my-article"`.
    pub fields: BTreeMap<String, String>,
}
