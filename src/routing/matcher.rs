//! Request path matching against a merged route collection.
//!
//! # Responsibilities
//! - Find the first route whose pattern matches the whole path
//! - Resolve captured values through the route's aspects
//! - Fall back to the longest plain slug that prefixes the path
//! - Report decorated parameters beside the query parameters
//!
//! # Design Decisions
//! - Routes are tried in collection order; the collection is built from
//!   pages sorted by slug descending, so the most specific page comes first
//! - A route whose aspect cannot resolve a value is skipped, not fatal
//! - The prefix fallback only considers plain slug routes and never the
//!   root slug, so enhanced routes keep exact semantics

use crate::routing::arguments::ROUTE_KEY;
use crate::routing::collection::RouteCollection;
use crate::routing::route::Route;
use crate::routing::types::{Parameters, RoutingResult};

/// A matched route with its resolved values.
#[derive(Debug, Clone)]
pub struct MatchResult {
    route_name: String,
    route: Route,
    parameters: Parameters,
    query_parameters: Parameters,
}

impl MatchResult {
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Resolved variable values, defaults and `_route`.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Query parameters of the request.
    pub fn query_parameters(&self) -> &Parameters {
        &self.query_parameters
    }

    /// Parameters recovered from decorations such as a `.json` suffix.
    pub fn decorated_parameters(&self) -> &Parameters {
        self.route.decorated_parameters()
    }

    /// Query parameters with decorated parameters merged in.
    pub fn remaining_query_parameters(&self) -> Parameters {
        let mut remaining = self.query_parameters.clone();
        remaining.extend(
            self.route
                .decorated_parameters()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        remaining
    }
}

/// Matches request paths against the routes of all candidate pages.
#[derive(Debug, Clone, Copy)]
pub struct PageUriMatcher<'a> {
    collection: &'a RouteCollection,
}

impl<'a> PageUriMatcher<'a> {
    pub fn new(collection: &'a RouteCollection) -> Self {
        Self { collection }
    }

    /// Match `path` (language prefix already removed).
    ///
    /// Returns `Ok(None)` when no route applies.
    pub fn match_path(&self, path: &str, query: &Parameters) -> RoutingResult<Option<MatchResult>> {
        for (name, route) in self.collection.iter() {
            let route_path = route.decorated_path().unwrap_or(path);
            let compiled = route.compile()?;
            let Some(captured) = compiled.captures(route_path) else {
                continue;
            };

            let mut values = route.defaults().clone();
            values.extend(captured);
            if let Some(parameters) = resolve_aspects(route, values)? {
                return Ok(Some(self.result(name, route, parameters, query)));
            }
        }

        let fallback = self.collection.iter().find(|(_, route)| {
            route.enhancer().is_none() && is_slug_prefix(route.path(), route.decorated_path().unwrap_or(path))
        });
        Ok(fallback.map(|(name, route)| self.result(name, route, Parameters::new(), query)))
    }

    fn result(&self, name: &str, route: &Route, mut parameters: Parameters, query: &Parameters) -> MatchResult {
        parameters.insert(ROUTE_KEY.to_string(), name.to_string());
        MatchResult {
            route_name: name.to_string(),
            route: route.clone(),
            parameters,
            query_parameters: query.clone(),
        }
    }
}

/// Map raw values through the route's aspects. `None` if any aspect
/// rejects its value.
fn resolve_aspects(route: &Route, values: Parameters) -> RoutingResult<Option<Parameters>> {
    let mut resolved = Parameters::new();
    for (name, value) in values {
        let value = match route.aspects().get(&name) {
            Some(aspect) => match aspect.resolve(&value)? {
                Some(value) => value,
                None => return Ok(None),
            },
            None => value,
        };
        resolved.insert(name, value);
    }
    Ok(Some(resolved))
}

/// Whether `slug` covers a leading run of whole segments of `path`.
pub fn is_slug_prefix(slug: &str, path: &str) -> bool {
    if slug.is_empty() || slug == "/" {
        return false;
    }
    match path.strip_prefix(slug) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
