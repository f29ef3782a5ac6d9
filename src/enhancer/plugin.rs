//! Plugin enhancer: route variables mapped into one parameter namespace.
//!
//! With namespace `tx_news` the variable `{news}` stands for the parameter
//! `tx_news[news]`. Generation only considers the variant when the
//! parameters contain something in the namespace.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::variant::VariantDefinition;
use super::{Enhancer, ResultingEnhancer, RoutingEnhancer};
use crate::aspect::Aspect;
use crate::config::schema::EnhancerConfig;
use crate::routing::arguments::RouteArguments;
use crate::routing::collection::RouteCollection;
use crate::routing::route::Route;
use crate::routing::types::{Parameters, RoutingError, RoutingResult};

#[derive(Debug, Clone)]
pub struct PluginEnhancer {
    definition: VariantDefinition,
}

impl PluginEnhancer {
    pub fn from_config(config: &EnhancerConfig, aspects: BTreeMap<String, Arc<dyn Aspect>>) -> RoutingResult<Self> {
        let definition = VariantDefinition::from_config(config, aspects)?;
        if definition.namespace().map(str::is_empty).unwrap_or(true) {
            return Err(RoutingError::InvalidEnhancer {
                name: config.name.clone(),
                reason: "missing 'namespace'".into(),
            });
        }
        Ok(Self { definition })
    }
}

impl Enhancer for PluginEnhancer {
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

impl RoutingEnhancer for PluginEnhancer {
    fn enhance_for_matching(&self, collection: &mut RouteCollection) -> RoutingResult<()> {
        self.definition.enhance_for_matching(collection);
        Ok(())
    }

    fn enhance_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters) -> RoutingResult<()> {
        if !self.definition.processor().has_namespace_parameters(parameters) {
            return Ok(());
        }
        self.definition.enhance_for_generation(collection, parameters)
    }

    fn parameter_names(&self) -> Vec<String> {
        self.definition.parameter_names()
    }
}

impl ResultingEnhancer for PluginEnhancer {
    fn build_result(&self, route: &Route, results: &Parameters, remaining: Parameters) -> RoutingResult<RouteArguments> {
        self.definition.build_result(route, results, remaining)
    }
}
