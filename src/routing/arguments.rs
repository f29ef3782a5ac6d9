//! Page arguments built from a matched route.
//!
//! # Responsibilities
//! - Carry the resolved page id, page type and argument sets
//! - Split arguments into static (aspect-bound, reversibly mapped) and
//!   dynamic (free-form, need a cache-hash)
//! - Guard against routes whose static aspects expand to too many URLs
//!
//! # Design Decisions
//! - Dynamic arguments are derived, never stored independently
//! - Arguments changed after construction mark the value as dirty; the
//!   generator refuses to produce a URL from a dirty value

use serde::Serialize;

use crate::aspect::AspectCapability;
use crate::routing::route::{CompiledRoute, Route};
use crate::routing::types::{Parameters, RoutingError, RoutingResult, MAX_STATIC_MAPPABLE_PRODUCT};

/// Match result key holding the matched route name.
pub const ROUTE_KEY: &str = "_route";

/// Page type used when nothing else applies.
pub const DEFAULT_PAGE_TYPE: &str = "0";

/// Decorated parameter that selects the page type.
pub const PAGE_TYPE_PARAMETER: &str = "type";

/// Resolved arguments of a routed page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteArguments {
    page_id: u32,
    page_type: String,
    route_arguments: Parameters,
    static_arguments: Parameters,
    dynamic_arguments: Parameters,
    query_arguments: Parameters,
    #[serde(skip)]
    dirty: bool,
}

impl RouteArguments {
    /// `static_arguments` must be a subset of `route_arguments`.
    pub fn new(
        page_id: u32,
        page_type: impl Into<String>,
        route_arguments: Parameters,
        static_arguments: Parameters,
        query_arguments: Parameters,
    ) -> Self {
        let mut arguments = Self {
            page_id,
            page_type: page_type.into(),
            route_arguments,
            static_arguments,
            dynamic_arguments: Parameters::new(),
            query_arguments,
            dirty: false,
        };
        arguments.dynamic_arguments = arguments.derive_dynamic_arguments();
        arguments
    }

    pub fn page_id(&self) -> u32 {
        self.page_id
    }

    pub fn page_type(&self) -> &str {
        &self.page_type
    }

    /// Arguments taken from the route path.
    pub fn route_arguments(&self) -> &Parameters {
        &self.route_arguments
    }

    pub fn static_arguments(&self) -> &Parameters {
        &self.static_arguments
    }

    pub fn dynamic_arguments(&self) -> &Parameters {
        &self.dynamic_arguments
    }

    /// Arguments taken from the query string and decorations.
    pub fn query_arguments(&self) -> &Parameters {
        &self.query_arguments
    }

    /// Route arguments merged over query arguments.
    pub fn arguments(&self) -> Parameters {
        let mut all = self.query_arguments.clone();
        all.extend(self.route_arguments.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    /// Set one more argument after construction.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_arguments.insert(key.into(), value.into());
        self.dirty = true;
        self
    }

    /// Merge more query arguments after construction.
    pub fn with_query_arguments(mut self, arguments: Parameters) -> Self {
        self.query_arguments.extend(arguments);
        self.dirty = true;
        self
    }

    /// Whether arguments were changed after the static/dynamic split.
    pub fn are_dirty(&self) -> bool {
        self.dirty
    }

    fn derive_dynamic_arguments(&self) -> Parameters {
        self.arguments()
            .into_iter()
            .filter(|(key, value)| self.static_arguments.get(key) != Some(value))
            .collect()
    }
}

/// Keep only compiled path variables from the match results.
pub fn filter_processed_parameters(compiled: &CompiledRoute, results: &Parameters) -> Parameters {
    results
        .iter()
        .filter(|(key, _)| compiled.path_variables().contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Reject routes whose countable static aspects combine to more than
/// `MAX_STATIC_MAPPABLE_PRODUCT` distinct URLs.
pub fn assert_maximum_static_mappable_amount(route: &Route, variable_names: &[String]) -> RoutingResult<()> {
    let countable = route.filter_aspects(
        |capability| matches!(capability, AspectCapability::StaticMappable { count: Some(_) }),
        variable_names,
    );
    if countable.is_empty() {
        return Ok(());
    }

    let product = countable
        .iter()
        .filter_map(|(_, aspect)| aspect.capability().count())
        .fold(1u64, u64::saturating_mul);

    if product > MAX_STATIC_MAPPABLE_PRODUCT {
        tracing::warn!(
            route = %route.path(),
            product = product,
            limit = MAX_STATIC_MAPPABLE_PRODUCT,
            "Static mappable aspects exceed limit"
        );
        return Err(RoutingError::StaticMappableOverflow { product });
    }
    Ok(())
}

/// Page type and the remaining parameters with decorated values merged in.
///
/// Without a decorated `type` the remaining parameters are returned as given.
pub fn resolve_type(route: &Route, mut remaining: Parameters) -> (String, Parameters) {
    let mut decorated = route.decorated_parameters().clone();
    let Some(page_type) = decorated.remove(PAGE_TYPE_PARAMETER) else {
        return (DEFAULT_PAGE_TYPE.to_string(), remaining);
    };
    remaining.extend(decorated);
    (page_type, remaining)
}

/// Names of route arguments bound to a static aspect.
pub fn static_argument_names(route: &Route, arguments: &Parameters) -> Vec<String> {
    let names: Vec<String> = arguments.keys().cloned().collect();
    route
        .filter_aspects(AspectCapability::is_static, &names)
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Build the page arguments for a matched route.
///
/// `results` are the match results of the route (variables, defaults and
/// `_route`); `remaining` are query parameters not consumed by the path.
pub fn build_page_arguments(route: &Route, results: &Parameters, remaining: Parameters) -> RoutingResult<RouteArguments> {
    let compiled = route.compile()?;
    let filtered = filter_processed_parameters(&compiled, results);
    assert_maximum_static_mappable_amount(route, compiled.path_variables())?;

    if let Some(resulting) = route.enhancer().and_then(|enhancer| enhancer.as_resulting()) {
        return resulting.build_result(route, results, remaining);
    }

    let page_id = route.page().default_language_uid();
    let (page_type, remaining) = resolve_type(route, remaining);
    let static_names = static_argument_names(route, &filtered);
    let static_arguments = filtered
        .iter()
        .filter(|(key, _)| static_names.contains(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(RouteArguments::new(page_id, page_type, filtered, static_arguments, remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::{Aspect, StaticRangeMapper};
    use crate::site::PageRecord;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn range(name: &str, end: u32) -> Arc<dyn Aspect> {
        Arc::new(StaticRangeMapper::new(name, "1", &end.to_string()).unwrap())
    }

    fn news_route(aspects: BTreeMap<String, Arc<dyn Aspect>>) -> Route {
        let mut route = Route::for_page(PageRecord::new(10, 1, "/news"));
        route.set_path("/news/{a}/{b}");
        route.set_aspects(aspects);
        route
    }

    #[test]
    fn test_dynamic_arguments_are_derived() {
        let arguments = RouteArguments::new(
            10,
            "0",
            params(&[("page", "2"), ("tag", "rust")]),
            params(&[("page", "2")]),
            params(&[("utm", "x")]),
        );
        assert_eq!(arguments.dynamic_arguments(), &params(&[("tag", "rust"), ("utm", "x")]));
        assert!(!arguments.are_dirty());

        let changed = arguments.with_argument("late", "1");
        assert!(changed.are_dirty());
        assert!(!changed.dynamic_arguments().contains_key("late"));
    }

    #[test]
    fn test_overflow_guard() {
        let route = news_route(BTreeMap::from([("a".to_string(), range("a", 101)), ("b".to_string(), range("b", 101))]));
        let names = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            assert_maximum_static_mappable_amount(&route, &names),
            Err(RoutingError::StaticMappableOverflow { product: 10201 })
        ));

        let route = news_route(BTreeMap::from([("a".to_string(), range("a", 100)), ("b".to_string(), range("b", 100))]));
        assert!(assert_maximum_static_mappable_amount(&route, &names).is_ok());
    }

    #[test]
    fn test_overflow_guard_ignores_unused_aspects() {
        let route = news_route(BTreeMap::from([("a".to_string(), range("a", 101)), ("b".to_string(), range("b", 101))]));
        assert!(assert_maximum_static_mappable_amount(&route, &["a".to_string()]).is_ok());
    }

    #[test]
    fn test_resolve_type() {
        let mut route = Route::for_page(PageRecord::new(10, 1, "/news"));
        let (page_type, remaining) = resolve_type(&route, params(&[("q", "1")]));
        assert_eq!(page_type, "0");
        assert_eq!(remaining, params(&[("q", "1")]));

        route.set_decorated_parameters(params(&[("type", "900"), ("format", "json")]));
        let (page_type, remaining) = resolve_type(&route, params(&[("q", "1")]));
        assert_eq!(page_type, "900");
        assert_eq!(remaining, params(&[("format", "json"), ("q", "1")]));
    }

    #[test]
    fn test_default_arguments_use_translation_parent() {
        let parent = PageRecord::new(10, 1, "/news");
        let translated = PageRecord::translation(11, &parent, 1, "/nachrichten");
        let mut route = Route::for_page(translated);
        route.set_path("/nachrichten/{a}");
        route.set_aspects(BTreeMap::from([("a".to_string(), range("a", 5))]));

        let results = params(&[("_route", "page_11_x"), ("a", "3")]);
        let arguments = build_page_arguments(&route, &results, params(&[("q", "1")])).unwrap();
        assert_eq!(arguments.page_id(), 10);
        assert_eq!(arguments.page_type(), "0");
        assert_eq!(arguments.route_arguments(), &params(&[("a", "3")]));
        assert_eq!(arguments.static_arguments(), &params(&[("a", "3")]));
        assert_eq!(arguments.dynamic_arguments(), &params(&[("q", "1")]));
    }
}
