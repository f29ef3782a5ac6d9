//! Shared fixtures for routing integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use page_router::aspect::{AspectFactory, InMemoryAliasStore};
use page_router::config::parse_config;
use page_router::enhancer::EnhancerFactory;
use page_router::routing::Sha256CacheHash;
use page_router::site::InMemoryPageFinder;
use page_router::{GenerateOptions, PageRouter, Parameters, ReferenceType, RouterConfig, Site, SiteLanguage};

/// Site fixture:
///
/// - `/news` (10): `Simple` enhancer `/{id}` with a static range aspect
/// - `/blog` (30): `Simple` enhancer `/{id}` without aspect (dynamic)
/// - `/shop` (20): `Plugin` enhancer `tx_shop` with static category and page
/// - `/articles` (40): `Plugin` enhancer with a persisted alias aspect
/// - `.json` suffix on every page maps to `type=900`
/// - German translations below `/de/`
pub const SITE_TOML: &str = r#"
[site]
identifier = "main"
root_page_id = 1
base = "https://example.com/"

[[site.languages]]
language_id = 0
base = "/"
locale = "en_US.UTF-8"
title = "English"

[[site.languages]]
language_id = 1
base = "/de/"
locale = "de_DE.UTF-8"
title = "Deutsch"

[[site.route_enhancers]]
name = "news"
type = "Simple"
route_path = "/{id}"
limit_to_pages = [10]

[site.route_enhancers.aspects.id]
type = "StaticRangeMapper"
start = "1"
end = "100"

[[site.route_enhancers]]
name = "blog"
type = "Simple"
route_path = "/{id}"
limit_to_pages = [30]

[[site.route_enhancers]]
name = "shop"
type = "Plugin"
namespace = "tx_shop"
route_path = "/{category}/{page}"
limit_to_pages = [20]
defaults = { page = "1" }
requirements = { page = "\\d+" }

[site.route_enhancers.aspects.category]
type = "StaticValueMapper"
map = { books = "1", music = "2" }
locale_map = [{ locale = "de_DE", map = { buecher = "1", musik = "2" } }]

[site.route_enhancers.aspects.page]
type = "StaticRangeMapper"
start = "1"
end = "50"

[[site.route_enhancers]]
name = "articles"
type = "Plugin"
namespace = "tx_articles"
route_path = "/{article}"
limit_to_pages = [40]

[site.route_enhancers.aspects.article]
type = "PersistedAliasMapper"
table_name = "tx_articles"
route_field_name = "path_segment"

[[site.route_enhancers]]
name = "page_types"
type = "PageType"
map = { ".json" = "900" }

[cache_hash]
encryption_key = "test-secret"
excluded_parameters = ["^utm_"]

[[pages]]
uid = 1
slug = "/"

[[pages]]
uid = 5
pid = 1
slug = "/about-us"

[[pages]]
uid = 12
pid = 5
slug = "/about-us/contact"

[[pages]]
uid = 13
pid = 1
slug = "/services/"

[[pages]]
uid = 10
pid = 1
slug = "/news"

[[pages]]
uid = 20
pid = 1
slug = "/shop"

[[pages]]
uid = 30
pid = 1
slug = "/blog"

[[pages]]
uid = 40
pid = 1
slug = "/articles"

[[pages]]
uid = 99
pid = 500
slug = "/orphan"

[[pages]]
uid = 101
l10n_parent = 1
language_id = 1
pid = 0
slug = "/"

[[pages]]
uid = 105
l10n_parent = 5
language_id = 1
pid = 1
slug = "/ueber-uns"

[[pages]]
uid = 110
l10n_parent = 10
language_id = 1
pid = 1
slug = "/nachrichten"

[[pages]]
uid = 120
l10n_parent = 20
language_id = 1
pid = 1
slug = "/laden"

[[aliases]]
table_name = "tx_articles"
uid = 7
fields = { path_segment = "hello-world" }

[[aliases]]
table_name = "tx_articles"
uid = 7
language_id = 1
fields = { path_segment = "hallo-welt" }
"#;

pub fn config() -> RouterConfig {
    parse_config(SITE_TOML).expect("fixture config is valid")
}

pub fn router() -> PageRouter {
    PageRouter::from_config(&config()).expect("fixture router builds")
}

/// Router over `config` with a custom enhancer factory.
pub fn router_with_enhancers(config: &RouterConfig, enhancer_factory: EnhancerFactory) -> PageRouter {
    let site = Site::from_config(&config.site).expect("fixture site builds");
    let page_finder = InMemoryPageFinder::new(site.root_page_id(), config.pages.clone());
    let alias_store = InMemoryAliasStore::new(config.aliases.clone());
    PageRouter::new(
        Arc::new(site),
        Arc::new(page_finder),
        Arc::new(enhancer_factory),
        Arc::new(AspectFactory::new().with_alias_store(Arc::new(alias_store))),
        Arc::new(Sha256CacheHash::from_config(&config.cache_hash)),
    )
}

pub fn language(router: &PageRouter, language_id: u32) -> SiteLanguage {
    router.site().language_by_id(language_id).expect("fixture language").clone()
}

pub fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn path_options() -> GenerateOptions {
    GenerateOptions {
        reference_type: ReferenceType::AbsolutePath,
        ..GenerateOptions::default()
    }
}

/// Split a generated absolute path into path and decoded query.
pub fn split_uri(uri: &str) -> (String, Parameters) {
    let url = url::Url::parse("https://example.com").expect("static base").join(uri).expect("generated uri parses");
    let query = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    (url.path().to_string(), query)
}
