//! Route variants shared by the simple and plugin enhancers.
//!
//! A variant extends a page's plain slug route with a configured route path,
//! e.g. `/news` + `/{news}/{page}`. Variables are deflated to regex-safe
//! names for the route and inflated back to parameter keys in results.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aspect::Aspect;
use crate::config::schema::EnhancerConfig;
use crate::routing::arguments::{filter_processed_parameters, resolve_type, static_argument_names, RouteArguments};
use crate::routing::collection::RouteCollection;
use crate::routing::route::{tokenize, Route, Token};
use crate::routing::types::{Parameters, RoutingError, RoutingResult};
use crate::routing::variables::VariableProcessor;

/// Name of the plain slug route every page collection starts with.
pub const DEFAULT_ROUTE_NAME: &str = "default";

/// A configured route path with its variable settings.
#[derive(Debug, Clone)]
pub struct VariantDefinition {
    name: String,
    namespace: Option<String>,
    route_path: String,
    defaults: Parameters,
    requirements: BTreeMap<String, String>,
    arguments: BTreeMap<String, String>,
    aspects: BTreeMap<String, Arc<dyn Aspect>>,
}

impl VariantDefinition {
    pub fn from_config(config: &EnhancerConfig, aspects: BTreeMap<String, Arc<dyn Aspect>>) -> RoutingResult<Self> {
        let route_path = config.route_path.clone().ok_or_else(|| RoutingError::InvalidEnhancer {
            name: config.name.clone(),
            reason: "missing 'route_path'".into(),
        })?;

        Ok(Self {
            name: config.name.clone(),
            namespace: config.namespace.clone(),
            route_path,
            defaults: config.defaults.clone(),
            requirements: config.requirements.clone(),
            arguments: config.arguments.clone(),
            aspects,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name of the contributed route within a page collection.
    pub fn route_name(&self) -> String {
        format!("enhancer_{}", self.name)
    }

    pub fn processor(&self) -> VariableProcessor<'_> {
        VariableProcessor::new(self.namespace.as_deref(), &self.arguments)
    }

    /// Copy of `default_route` extended with this variant's route path.
    ///
    /// Page, decorations and everything else already attached to the
    /// default route carry over.
    pub fn variant_of(&self, default_route: &Route) -> Route {
        let processor = self.processor();
        let mut route = default_route.clone();
        route.set_path(format!(
            "{}/{}",
            default_route.path().trim_end_matches('/'),
            processor.deflate_route_path(&self.route_path).trim_start_matches('/')
        ));
        route.set_defaults(processor.deflate_keys(&self.defaults));
        route.set_requirements(processor.deflate_keys(&self.requirements));
        route.set_aspects(processor.deflate_keys(&self.aspects));
        route
    }

    pub fn enhance_for_matching(&self, collection: &mut RouteCollection) {
        if let Some(default_route) = collection.get(DEFAULT_ROUTE_NAME) {
            let variant = self.variant_of(default_route);
            collection.add(self.route_name(), variant);
        }
    }

    /// Add the variant when `parameters` supply every mandatory variable.
    pub fn enhance_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters) -> RoutingResult<()> {
        let Some(default_route) = collection.get(DEFAULT_ROUTE_NAME) else {
            return Ok(());
        };
        let mut variant = self.variant_of(default_route);
        let compiled = variant.compile()?;
        let deflated = self.processor().deflate_parameters(parameters, compiled.path_variables());

        let satisfied = compiled
            .path_variables()
            .iter()
            .all(|name| deflated.contains_key(name) || variant.defaults().contains_key(name));
        if !satisfied {
            return Ok(());
        }

        variant.set_deflated_parameters(deflated);
        collection.add(self.route_name(), variant);
        Ok(())
    }

    /// Parameter keys of this variant's variables, in path order.
    pub fn parameter_names(&self) -> Vec<String> {
        let processor = self.processor();
        tokenize(&processor.deflate_route_path(&self.route_path))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|token| match token {
                Token::Variable { name, .. } => Some(processor.inflate_name(&name)),
                Token::Text(_) => None,
            })
            .collect()
    }

    /// Route arguments with variables inflated to parameter keys.
    ///
    /// Variables bound to a static aspect are static; all others are
    /// dynamic.
    pub fn build_result(&self, route: &Route, results: &Parameters, remaining: Parameters) -> RoutingResult<RouteArguments> {
        let compiled = route.compile()?;
        let variables = filter_processed_parameters(&compiled, results);
        let static_names = static_argument_names(route, &variables);
        let static_variables: Parameters = variables
            .iter()
            .filter(|(key, _)| static_names.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let processor = self.processor();
        let (page_type, remaining) = resolve_type(route, remaining);
        Ok(RouteArguments::new(
            route.page().default_language_uid(),
            page_type,
            processor.inflate_parameters(&variables),
            processor.inflate_parameters(&static_variables),
            remaining,
        ))
    }
}
