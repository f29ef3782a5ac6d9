//! URL generation from a generation-oriented route collection.
//!
//! # Data Flow
//! ```text
//! RouteCollection (default route + enhancer variants, decorated)
//!     → iterate most specific first (reverse insertion order)
//!     → aspects map parameter values to path segments
//!     → first route that substitutes wins
//!     → compose_uri (language base + path + query + fragment)
//! ```
//!
//! # Design Decisions
//! - A route that cannot take the parameters is skipped, never fatal
//! - Query strings are RFC 3986 encoded in key order

use percent_encoding::utf8_percent_encode;
use url::{Position, Url};

use crate::routing::arguments::ROUTE_KEY;
use crate::routing::cache_hash::UNRESERVED;
use crate::routing::collection::RouteCollection;
use crate::routing::route::Route;
use crate::routing::types::{Parameters, RoutingResult};
use crate::site::PageRecord;

/// Parameter selecting the target language of a generated URL.
pub const LANGUAGE_PARAMETER: &str = "_language";

/// Shape of a generated reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceType {
    /// `/path?query#fragment`
    #[default]
    AbsolutePath,
    /// `scheme://host/path?query#fragment`
    AbsoluteUrl,
}

/// Options for `PageRouter::generate_uri`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Target language, unless the parameters carry `_language`.
    pub language: Option<u32>,
    pub fragment: Option<String>,
    pub reference_type: ReferenceType,
}

/// The page a URL is generated for.
#[derive(Debug, Clone)]
pub enum PageReference {
    /// Default language uid; the translation is looked up.
    Id(u32),
    /// An already loaded row.
    Record(PageRecord),
}

impl From<u32> for PageReference {
    fn from(page_id: u32) -> Self {
        PageReference::Id(page_id)
    }
}

impl From<PageRecord> for PageReference {
    fn from(page: PageRecord) -> Self {
        PageReference::Record(page)
    }
}

/// The route that produced a path.
#[derive(Debug, Clone)]
pub struct GeneratedRoute {
    pub route_name: String,
    pub route: Route,
    pub path: String,
    /// Parameter values of the route variables, plus `_route`.
    pub results: Parameters,
    /// Parameters not consumed by the path.
    pub remaining: Parameters,
}

/// Generates paths from one page's route collection.
#[derive(Debug, Clone, Copy)]
pub struct UrlGenerator<'a> {
    collection: &'a RouteCollection,
}

impl<'a> UrlGenerator<'a> {
    pub fn new(collection: &'a RouteCollection) -> Self {
        Self { collection }
    }

    /// First route, most specific first, that accepts `parameters`.
    ///
    /// Routes prepared by enhancers use their own deflated parameters.
    pub fn generate(&self, parameters: &Parameters) -> RoutingResult<Option<GeneratedRoute>> {
        for (name, route) in self.collection.iter().rev() {
            let parameters = route.deflated_parameters().unwrap_or(parameters);
            if let Some(generated) = self.try_route(name, route, parameters)? {
                return Ok(Some(generated));
            }
        }
        Ok(None)
    }

    fn try_route(&self, name: &str, route: &Route, parameters: &Parameters) -> RoutingResult<Option<GeneratedRoute>> {
        let compiled = route.compile()?;

        let mut raw = parameters.clone();
        for variable in compiled.path_variables() {
            let (Some(aspect), Some(value)) = (route.aspects().get(variable), parameters.get(variable)) else {
                continue;
            };
            match aspect.generate(value)? {
                Some(segment) => {
                    raw.insert(variable.clone(), segment);
                }
                None => {
                    tracing::debug!(route = %name, variable = %variable, value = %value, "Aspect rejected value");
                    return Ok(None);
                }
            }
        }

        let (path, remaining) = match compiled.generate(route, &raw) {
            Ok(generated) => generated,
            Err(e) => {
                tracing::debug!(route = %name, reason = %e, "Skipping route candidate");
                return Ok(None);
            }
        };

        let mut results = Parameters::new();
        for variable in compiled.path_variables() {
            let value = match parameters.get(variable) {
                Some(value) => value.clone(),
                None => match route.defaults().get(variable) {
                    Some(default) => resolve_default(route, variable, default)?,
                    None => continue,
                },
            };
            results.insert(variable.clone(), value);
        }
        results.insert(ROUTE_KEY.to_string(), name.to_string());

        Ok(Some(GeneratedRoute {
            route_name: name.to_string(),
            route: route.clone(),
            path,
            results,
            remaining,
        }))
    }
}

/// Defaults are path segments; map them to parameter values.
fn resolve_default(route: &Route, variable: &str, default: &str) -> RoutingResult<String> {
    match route.aspects().get(variable) {
        Some(aspect) => Ok(aspect.resolve(default)?.unwrap_or_else(|| default.to_string())),
        None => Ok(default.to_string()),
    }
}

/// `k=v` pairs joined by `&`, RFC 3986 encoded.
pub fn build_query(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, UNRESERVED),
                utf8_percent_encode(value, UNRESERVED)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Place `path` below `base` and attach query and fragment.
pub fn compose_uri(
    base: &Url,
    path: &str,
    query: &Parameters,
    fragment: Option<&str>,
    reference_type: ReferenceType,
) -> String {
    let mut url = base.clone();
    url.set_path(&format!("{}{}", base.path().trim_end_matches('/'), path));
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&build_query(query)));
    }
    url.set_fragment(fragment.filter(|f| !f.is_empty()));

    match reference_type {
        ReferenceType::AbsoluteUrl => url.to_string(),
        ReferenceType::AbsolutePath => url[Position::BeforePath..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::{Aspect, StaticRangeMapper};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn collection() -> RouteCollection {
        let default = Route::for_page(PageRecord::new(10, 1, "/news"));
        let mut variant = default.clone();
        variant.set_path("/news/{id}");
        let range: Arc<dyn Aspect> = Arc::new(StaticRangeMapper::new("id", "1", "100").unwrap());
        variant.set_aspects(BTreeMap::from([("id".to_string(), range)]));

        let mut collection = RouteCollection::new();
        collection.add("default", default);
        collection.add("enhancer_news", variant);
        collection
    }

    #[test]
    fn test_most_specific_route_first() {
        let collection = collection();
        let generated = UrlGenerator::new(&collection)
            .generate(&params(&[("id", "42"), ("q", "x")]))
            .unwrap()
            .unwrap();
        assert_eq!(generated.route_name, "enhancer_news");
        assert_eq!(generated.path, "/news/42");
        assert_eq!(generated.remaining, params(&[("q", "x")]));
        assert_eq!(generated.results, params(&[("_route", "enhancer_news"), ("id", "42")]));
    }

    #[test]
    fn test_rejected_value_falls_back() {
        let collection = collection();
        let generated = UrlGenerator::new(&collection)
            .generate(&params(&[("id", "4200")]))
            .unwrap()
            .unwrap();
        assert_eq!(generated.route_name, "default");
        assert_eq!(generated.path, "/news");
        assert_eq!(generated.remaining, params(&[("id", "4200")]));
    }

    #[test]
    fn test_compose_uri() {
        let base = Url::parse("https://example.com/de/").unwrap();
        let query = params(&[("tx_news[news]", "a b"), ("cHash", "ff")]);

        assert_eq!(
            compose_uri(&base, "/news", &query, Some("top"), ReferenceType::AbsolutePath),
            "/de/news?cHash=ff&tx_news%5Bnews%5D=a%20b#top"
        );
        assert_eq!(
            compose_uri(&base, "/", &Parameters::new(), None, ReferenceType::AbsoluteUrl),
            "https://example.com/de/"
        );
    }
}
