//! Page routing in both directions.
//!
//! # Responsibilities
//! - Resolve a request path to route arguments (`match_request`)
//! - Generate a URI for a page and parameters (`generate_uri`)
//! - Build per-page route collections from the site's enhancers
//!
//! # Data Flow
//! ```text
//! Matching:
//!     path → strip language prefix → candidate_slugs
//!     → PageFinder::find_pages (slug descending)
//!     → per page: default route, decorate, enhance, prefix names with page id
//!     → PageUriMatcher → build_page_arguments → RouteArguments
//!
//! Generation:
//!     page + parameters → resolve language → PageFinder::find_page_by_id
//!     → default route, enhance, decorate → UrlGenerator (most specific first)
//!     → build_page_arguments → cHash for dynamic arguments → compose_uri
//! ```
//!
//! # Design Decisions
//! - No state is kept between operations; collections are built per call
//! - Collaborators (page finder, factories, cache hash) are injected
//! - "No match" is `Ok(None)`; only configuration and consistency failures
//!   are errors

use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::aspect::{AspectFactory, InMemoryAliasStore};
use crate::config::schema::RouterConfig;
use crate::enhancer::variant::DEFAULT_ROUTE_NAME;
use crate::enhancer::{check_parameter_overlaps, Enhancer, EnhancerFactory};
use crate::observability::metrics;
use crate::routing::arguments::{build_page_arguments, RouteArguments};
use crate::routing::cache_hash::{CacheHashCalculator, Sha256CacheHash, CACHE_HASH_PARAMETER};
use crate::routing::collection::RouteCollection;
use crate::routing::generator::{compose_uri, GenerateOptions, PageReference, UrlGenerator, LANGUAGE_PARAMETER};
use crate::routing::matcher::{MatchResult, PageUriMatcher};
use crate::routing::route::Route;
use crate::routing::slug::candidate_slugs;
use crate::routing::types::{Parameters, RoutingError, RoutingResult};
use crate::site::{InMemoryPageFinder, PageFinder, PageRecord, Site, SiteLanguage};

/// Bidirectional router for the pages of one site.
#[derive(Clone)]
pub struct PageRouter {
    site: Arc<Site>,
    page_finder: Arc<dyn PageFinder>,
    enhancer_factory: Arc<EnhancerFactory>,
    aspect_factory: Arc<AspectFactory>,
    cache_hash: Arc<dyn CacheHashCalculator>,
}

impl std::fmt::Debug for PageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRouter")
            .field("site", &self.site.identifier())
            .field("enhancer_factory", &self.enhancer_factory)
            .field("aspect_factory", &self.aspect_factory)
            .field("cache_hash", &self.cache_hash)
            .finish()
    }
}

impl PageRouter {
    pub fn new(
        site: Arc<Site>,
        page_finder: Arc<dyn PageFinder>,
        enhancer_factory: Arc<EnhancerFactory>,
        aspect_factory: Arc<AspectFactory>,
        cache_hash: Arc<dyn CacheHashCalculator>,
    ) -> Self {
        Self {
            site,
            page_finder,
            enhancer_factory,
            aspect_factory,
            cache_hash,
        }
    }

    /// Router over the fixture pages and aliases of `config`, with the
    /// built-in enhancer and aspect types.
    pub fn from_config(config: &RouterConfig) -> RoutingResult<Self> {
        let site = Site::from_config(&config.site)?;
        let page_finder = InMemoryPageFinder::new(site.root_page_id(), config.pages.clone());
        let alias_store = InMemoryAliasStore::new(config.aliases.clone());

        Ok(Self::new(
            Arc::new(site),
            Arc::new(page_finder),
            Arc::new(EnhancerFactory::new()),
            Arc::new(AspectFactory::new().with_alias_store(Arc::new(alias_store))),
            Arc::new(Sha256CacheHash::from_config(&config.cache_hash)),
        ))
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Resolve a request path in `language`.
    ///
    /// `path` is the URI path including the language prefix; `query` the
    /// decoded query parameters.
    pub fn match_request(
        &self,
        path: &str,
        query: &Parameters,
        language: &SiteLanguage,
    ) -> RoutingResult<Option<RouteArguments>> {
        let outcome = self.match_route(path, query, language).and_then(|matched| {
            matched
                .map(|m| build_page_arguments(m.route(), m.parameters(), m.query_parameters().clone()))
                .transpose()
        });

        match &outcome {
            Ok(Some(arguments)) => {
                tracing::debug!(path = %path, page_id = arguments.page_id(), page_type = %arguments.page_type(), "Request matched");
                metrics::record_match("hit");
            }
            Ok(None) => {
                tracing::debug!(path = %path, language = language.language_id(), "No route matched");
                metrics::record_match("miss");
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Request matching failed");
                metrics::record_match("error");
            }
        }
        outcome
    }

    /// Find the matching route without building route arguments.
    pub fn match_route(&self, path: &str, query: &Parameters, language: &SiteLanguage) -> RoutingResult<Option<MatchResult>> {
        let Some(route_path) = language_route_path(path, language) else {
            return Ok(None);
        };

        let candidates = candidate_slugs(&route_path);
        let pages = self.page_finder.find_pages(&candidates, language.language_id())?;
        if pages.is_empty() {
            return Ok(None);
        }

        let mut collection = RouteCollection::new();
        for page in pages {
            collection.add_collection(self.matching_routes_for_page(page, &route_path, language)?);
        }
        metrics::record_route_candidates(collection.len());

        PageUriMatcher::new(&collection).match_path(&route_path, query)
    }

    /// Generate a URI for a page.
    ///
    /// A `_language` parameter selects the language and wins over
    /// `options.language`; a `cHash` parameter is ignored.
    pub fn generate_uri(
        &self,
        page: impl Into<PageReference>,
        parameters: Parameters,
        options: &GenerateOptions,
    ) -> RoutingResult<String> {
        let outcome = self.generate(page.into(), parameters, options);
        match &outcome {
            Ok(uri) => {
                tracing::debug!(uri = %uri, "URI generated");
                metrics::record_generate("hit");
            }
            Err(e) => {
                match e {
                    RoutingError::DirtyArguments { .. } | RoutingError::StaticMappableOverflow { .. } => {
                        tracing::warn!(error = %e, "URI generation failed")
                    }
                    _ => tracing::debug!(error = %e, "URI generation failed"),
                }
                metrics::record_generate("error");
            }
        }
        outcome
    }

    fn generate(&self, page: PageReference, mut parameters: Parameters, options: &GenerateOptions) -> RoutingResult<String> {
        let language = self.resolve_language(&mut parameters, options)?;
        parameters.remove(CACHE_HASH_PARAMETER);

        let page = match page {
            PageReference::Id(page_id) => self
                .page_finder
                .find_page_by_id(page_id, language.language_id())?
                .ok_or(RoutingError::PageNotFound(page_id))?,
            PageReference::Record(page) => page,
        };
        let page_id = page.default_language_uid();

        let collection = self.generation_routes_for_page(page, &parameters, language)?;
        metrics::record_route_candidates(collection.len());

        let generated = UrlGenerator::new(&collection)
            .generate(&parameters)?
            .ok_or(RoutingError::CannotGenerate { page_id })?;

        let arguments = build_page_arguments(&generated.route, &generated.results, generated.remaining.clone())?;
        if arguments.are_dirty() {
            return Err(RoutingError::DirtyArguments { page_id });
        }

        let mut query = generated.remaining;
        if !arguments.dynamic_arguments().is_empty() {
            if let Some(hash) = self.cache_hash.calculate(page_id, arguments.dynamic_arguments()) {
                query.insert(CACHE_HASH_PARAMETER.to_string(), hash);
                metrics::record_cache_hash();
            }
        }

        tracing::debug!(
            page_id = page_id,
            route = %generated.route_name,
            path = %generated.path,
            "Route candidate accepted"
        );

        Ok(compose_uri(
            language.base(),
            &generated.path,
            &query,
            options.fragment.as_deref(),
            options.reference_type,
        ))
    }

    fn resolve_language(&self, parameters: &mut Parameters, options: &GenerateOptions) -> RoutingResult<&SiteLanguage> {
        let requested = match parameters.remove(LANGUAGE_PARAMETER) {
            Some(value) => Some(value.parse::<u32>().map_err(|_| RoutingError::InvalidParameter {
                name: LANGUAGE_PARAMETER.to_string(),
                value,
            })?),
            None => options.language,
        };
        match requested {
            Some(language_id) => self.site.language_by_id(language_id),
            None => Ok(self.site.default_language()),
        }
    }

    /// Enhancers configured for `page_id` (default language uid).
    pub fn enhancers_for_page(&self, page_id: u32, language: &SiteLanguage) -> RoutingResult<Vec<Arc<dyn Enhancer>>> {
        let mut enhancers = Vec::new();
        for config in self.site.route_enhancers() {
            if let Some(limit) = &config.limit_to_pages {
                if !limit.contains(&page_id) {
                    continue;
                }
            }
            let aspects = self.aspect_factory.create_aspects(&config.aspects, language)?;
            enhancers.push(self.enhancer_factory.create(config, aspects)?);
        }
        check_parameter_overlaps(&enhancers)?;
        Ok(enhancers)
    }

    fn matching_routes_for_page(
        &self,
        page: PageRecord,
        route_path: &str,
        language: &SiteLanguage,
    ) -> RoutingResult<RouteCollection> {
        let enhancers = self.enhancers_for_page(page.default_language_uid(), language)?;
        let prefix = format!("page_{}_", page.uid);

        let mut collection = RouteCollection::new();
        collection.add(DEFAULT_ROUTE_NAME, Route::for_page(page));

        let mut decorated_path: Option<String> = None;
        let mut decorated = Parameters::new();
        for decorating in enhancers.iter().filter_map(|e| e.as_decorating()) {
            let decoration = decorating.decorate_for_matching(decorated_path.as_deref().unwrap_or(route_path));
            for (name, value) in decoration.parameters {
                if decorated.contains_key(&name) {
                    return Err(RoutingError::AmbiguousDecoration { parameter: name });
                }
                decorated.insert(name, value);
            }
            if let Some(path) = decoration.route_path {
                decorated_path = Some(path);
            }
        }
        if decorated_path.is_some() || !decorated.is_empty() {
            let path = decorated_path.unwrap_or_else(|| route_path.to_string());
            for (_, route) in collection.iter_mut() {
                route.set_decorated_path(path.clone());
                route.set_decorated_parameters(decorated.clone());
            }
        }

        for enhancer in &enhancers {
            if let Some(routing) = enhancer.as_routing() {
                let before = collection.len();
                routing.enhance_for_matching(&mut collection)?;
                bind_enhancer(&mut collection, before, enhancer);
            }
        }

        collection.add_name_prefix(&prefix);
        Ok(collection)
    }

    fn generation_routes_for_page(
        &self,
        page: PageRecord,
        parameters: &Parameters,
        language: &SiteLanguage,
    ) -> RoutingResult<RouteCollection> {
        let enhancers = self.enhancers_for_page(page.default_language_uid(), language)?;

        let mut collection = RouteCollection::new();
        collection.add(DEFAULT_ROUTE_NAME, Route::for_page(page));

        for enhancer in &enhancers {
            if let Some(routing) = enhancer.as_routing() {
                let before = collection.len();
                routing.enhance_for_generation(&mut collection, parameters)?;
                bind_enhancer(&mut collection, before, enhancer);
            }
        }
        for decorating in enhancers.iter().filter_map(|e| e.as_decorating()) {
            decorating.decorate_for_generation(&mut collection, parameters);
        }
        Ok(collection)
    }
}

/// Routes added from `index` on belong to `enhancer`.
fn bind_enhancer(collection: &mut RouteCollection, index: usize, enhancer: &Arc<dyn Enhancer>) {
    for route in collection.iter_from_mut(index) {
        route.set_enhancer(Arc::clone(enhancer));
    }
}

/// Decoded request path below the language base, normalized to a leading
/// slash and no trailing slash. `None` when the path is outside the base.
///
/// Segments are decoded one by one; a `%` or `/` inside a segment stays
/// escaped so it cannot split or re-decode a value.
pub fn language_route_path(path: &str, language: &SiteLanguage) -> Option<String> {
    let decoded = path.split('/').map(decode_segment).collect::<Vec<_>>().join("/");

    let prefix = language.path_prefix();
    let rest = if prefix.is_empty() {
        decoded.as_str()
    } else {
        let rest = decoded.strip_prefix(prefix)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        rest
    };

    let trimmed = rest.trim_matches('/');
    Some(format!("/{}", trimmed))
}

fn decode_segment(segment: &str) -> String {
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    decoded.replace('%', "%25").replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_language_route_path() {
        let default = SiteLanguage::new(0, Url::parse("https://example.com/").unwrap(), "en_US.UTF-8");
        assert_eq!(language_route_path("/about-us/", &default).as_deref(), Some("/about-us"));
        assert_eq!(language_route_path("", &default).as_deref(), Some("/"));
        assert_eq!(language_route_path("/caf%C3%A9", &default).as_deref(), Some("/café"));
        assert_eq!(language_route_path("/blog/a%2Fb", &default).as_deref(), Some("/blog/a%2Fb"));
        assert_eq!(language_route_path("/blog/a%252Fb", &default).as_deref(), Some("/blog/a%252Fb"));
        assert_eq!(language_route_path("/blog/50%25%20off", &default).as_deref(), Some("/blog/50%25 off"));

        let german = SiteLanguage::new(1, Url::parse("https://example.com/de/").unwrap(), "de_DE.UTF-8");
        assert_eq!(language_route_path("/de/ueber-uns", &german).as_deref(), Some("/ueber-uns"));
        assert_eq!(language_route_path("/de", &german).as_deref(), Some("/"));
        assert_eq!(language_route_path("/debug", &german), None);
        assert_eq!(language_route_path("/en/about", &german), None);
    }
}
