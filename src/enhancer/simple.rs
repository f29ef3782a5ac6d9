//! Simple enhancer: route variables mapped 1:1 to top-level parameters.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::variant::VariantDefinition;
use super::{Enhancer, ResultingEnhancer, RoutingEnhancer};
use crate::aspect::Aspect;
use crate::config::schema::EnhancerConfig;
use crate::routing::arguments::RouteArguments;
use crate::routing::collection::RouteCollection;
use crate::routing::route::Route;
use crate::routing::types::{Parameters, RoutingResult};

/// Adds one route variant, e.g. `/{category}/{page}`, to every page it
/// applies to.
#[derive(Debug, Clone)]
pub struct SimpleEnhancer {
    definition: VariantDefinition,
}

impl SimpleEnhancer {
    pub fn from_config(config: &EnhancerConfig, aspects: BTreeMap<String, Arc<dyn Aspect>>) -> RoutingResult<Self> {
        Ok(Self {
            definition: VariantDefinition::from_config(config, aspects)?,
        })
    }
}

impl Enhancer for SimpleEnhancer {
    fn name(&self) -> &str {
        self.definition.name()
    }

    fn as_routing(&self) -> Option<&dyn RoutingEnhancer> {
        Some(self)
    }

    fn as_resulting(&self) -> Option<&dyn ResultingEnhancer> {
        Some(self)
    }
}

impl RoutingEnhancer for SimpleEnhancer {
    fn enhance_for_matching(&self, collection: &mut RouteCollection) -> RoutingResult<()> {
        self.definition.enhance_for_matching(collection);
        Ok(())
    }

    fn enhance_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters) -> RoutingResult<()> {
        self.definition.enhance_for_generation(collection, parameters)
    }

    fn parameter_names(&self) -> Vec<String> {
        self.definition.parameter_names()
    }
}

impl ResultingEnhancer for SimpleEnhancer {
    fn build_result(&self, route: &Route, results: &Parameters, remaining: Parameters) -> RoutingResult<RouteArguments> {
        self.definition.build_result(route, results, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::variant::DEFAULT_ROUTE_NAME;
    use crate::site::PageRecord;

    #[test]
    fn test_simple_variant() {
        let config = EnhancerConfig {
            name: "list".into(),
            enhancer_type: "Simple".into(),
            route_path: Some("/{category}/{page}".into()),
            defaults: BTreeMap::from([("page".to_string(), "1".to_string())]),
            requirements: BTreeMap::from([("page".to_string(), "\\d+".to_string())]),
            ..EnhancerConfig::default()
        };
        let enhancer = SimpleEnhancer::from_config(&config, BTreeMap::new()).unwrap();
        assert_eq!(enhancer.name(), "list");
        assert!(enhancer.as_decorating().is_none());

        let mut collection = RouteCollection::new();
        collection.add(DEFAULT_ROUTE_NAME, Route::for_page(PageRecord::new(3, 1, "/shop")));
        enhancer.enhance_for_matching(&mut collection).unwrap();

        let route = collection.get("enhancer_list").unwrap();
        let compiled = route.compile().unwrap();
        let captured = compiled.captures("/shop/books").unwrap();
        assert_eq!(captured.get("category").map(String::as_str), Some("books"));
        assert!(compiled.captures("/shop/books/x").is_none());
        assert_eq!(enhancer.parameter_names(), vec!["category", "page"]);
    }
}
