//! Route enhancers: configuration-driven extensions of a page's route.
//!
//! # Data Flow
//! ```text
//! Matching:
//!     page default route
//!     → DecoratingEnhancer::decorate_for_matching (strip suffixes, recover `type`)
//!     → RoutingEnhancer::enhance_for_matching (add variants with variables)
//!     → matched route → ResultingEnhancer::build_result
//!
//! Generation:
//!     page default route
//!     → RoutingEnhancer::enhance_for_generation (variants the parameters can fill)
//!     → DecoratingEnhancer::decorate_for_generation (append suffixes)
//! ```
//!
//! # Design Decisions
//! - Capabilities are queried (`as_routing`, `as_decorating`, `as_resulting`)
//!   instead of downcasting a type hierarchy
//! - Decoration never adds path variables; its parameters travel beside the path
//! - Enhancers are built per request by `EnhancerFactory`, never global

pub mod factory;
pub mod page_type;
pub mod plugin;
pub mod simple;
pub mod variant;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::routing::arguments::RouteArguments;
use crate::routing::collection::RouteCollection;
use crate::routing::route::Route;
use crate::routing::types::{Parameters, RoutingError, RoutingResult};

pub use factory::EnhancerFactory;
pub use page_type::PageTypeDecorator;
pub use plugin::PluginEnhancer;
pub use simple::SimpleEnhancer;

/// A route enhancer with optional capabilities.
pub trait Enhancer: Send + Sync + fmt::Debug {
    /// Configured enhancer name.
    fn name(&self) -> &str;

    fn as_routing(&self) -> Option<&dyn RoutingEnhancer> {
        None
    }

    fn as_decorating(&self) -> Option<&dyn DecoratingEnhancer> {
        None
    }

    fn as_resulting(&self) -> Option<&dyn ResultingEnhancer> {
        None
    }
}

/// Contributes route variants with path variables.
pub trait RoutingEnhancer {
    /// Add variants of the `default` route used for matching.
    fn enhance_for_matching(&self, collection: &mut RouteCollection) -> RoutingResult<()>;

    /// Add variants for generation. Variants the parameters cannot fill are
    /// not added.
    fn enhance_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters) -> RoutingResult<()>;

    /// Parameter keys the contributed variables map to.
    fn parameter_names(&self) -> Vec<String>;
}

/// Path-neutral metadata such as a page type suffix.
pub trait DecoratingEnhancer {
    /// Strip decorations from `route_path` and report what they meant.
    fn decorate_for_matching(&self, route_path: &str) -> Decoration;

    /// Apply decorations to every route that may be generated.
    fn decorate_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters);

    /// Parameter keys this decorator recovers.
    fn parameter_names(&self) -> Vec<String>;
}

/// Takes over building the route arguments for routes it contributed.
pub trait ResultingEnhancer {
    /// `results` are the complete match results, internal keys included.
    fn build_result(&self, route: &Route, results: &Parameters, remaining: Parameters) -> RoutingResult<RouteArguments>;
}

/// Outcome of decorating a request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    /// Path to match instead of the request path.
    pub route_path: Option<String>,
    /// Parameters recovered from the decoration.
    pub parameters: Parameters,
}

/// Reject enhancer sets where a decorated parameter is recovered twice or
/// also bound to a routing variable.
pub fn check_parameter_overlaps(enhancers: &[Arc<dyn Enhancer>]) -> RoutingResult<()> {
    let mut decorated = BTreeSet::new();
    for decorating in enhancers.iter().filter_map(|e| e.as_decorating()) {
        for name in decorating.parameter_names() {
            if !decorated.insert(name.clone()) {
                return Err(RoutingError::AmbiguousDecoration { parameter: name });
            }
        }
    }

    for routing in enhancers.iter().filter_map(|e| e.as_routing()) {
        if let Some(name) = routing.parameter_names().into_iter().find(|n| decorated.contains(n)) {
            return Err(RoutingError::AmbiguousDecoration { parameter: name });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::EnhancerConfig;
    use std::collections::BTreeMap;

    fn create(name: &str, enhancer_type: &str, route_path: Option<&str>) -> Arc<dyn Enhancer> {
        let config = EnhancerConfig {
            name: name.into(),
            enhancer_type: enhancer_type.into(),
            route_path: route_path.map(String::from),
            map: BTreeMap::from([(".json".to_string(), "900".to_string())]),
            ..EnhancerConfig::default()
        };
        EnhancerFactory::new().create(&config, BTreeMap::new()).unwrap()
    }

    #[test]
    fn test_disjoint_parameters_pass() {
        let enhancers = vec![create("types", "PageType", None), create("list", "Simple", Some("/{page}"))];
        assert!(check_parameter_overlaps(&enhancers).is_ok());
    }

    #[test]
    fn test_overlaps_are_rejected() {
        let twice = vec![create("a", "PageType", None), create("b", "PageType", None)];
        assert!(matches!(
            check_parameter_overlaps(&twice),
            Err(RoutingError::AmbiguousDecoration { parameter }) if parameter == "type"
        ));

        let routed = vec![create("types", "PageType", None), create("list", "Simple", Some("/{type}"))];
        assert!(matches!(
            check_parameter_overlaps(&routed),
            Err(RoutingError::AmbiguousDecoration { .. })
        ));
    }
}
