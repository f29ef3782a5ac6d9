//! Enhancer construction from configuration.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Enhancer, PageTypeDecorator, PluginEnhancer, SimpleEnhancer};
use crate::aspect::Aspect;
use crate::config::schema::EnhancerConfig;
use crate::routing::types::{RoutingError, RoutingResult};

type EnhancerConstructor =
    Box<dyn Fn(&EnhancerConfig, BTreeMap<String, Arc<dyn Aspect>>) -> RoutingResult<Arc<dyn Enhancer>> + Send + Sync>;

/// Creates enhancers by configured type.
///
/// Built-in types: `Simple`, `Plugin`, `PageType`. Custom types are
/// registered up front and take precedence.
#[derive(Default)]
pub struct EnhancerFactory {
    custom: HashMap<String, EnhancerConstructor>,
}

impl std::fmt::Debug for EnhancerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancerFactory")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EnhancerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a custom enhancer type.
    pub fn register<F>(&mut self, enhancer_type: impl Into<String>, constructor: F)
    where
        F: Fn(&EnhancerConfig, BTreeMap<String, Arc<dyn Aspect>>) -> RoutingResult<Arc<dyn Enhancer>>
            + Send
            + Sync
            + 'static,
    {
        self.custom.insert(enhancer_type.into(), Box::new(constructor));
    }

    /// Whether `enhancer_type` can be created.
    pub fn supports(&self, enhancer_type: &str) -> bool {
        self.custom.contains_key(enhancer_type) || matches!(enhancer_type, "Simple" | "Plugin" | "PageType")
    }

    pub fn create(
        &self,
        config: &EnhancerConfig,
        aspects: BTreeMap<String, Arc<dyn Aspect>>,
    ) -> RoutingResult<Arc<dyn Enhancer>> {
        if let Some(constructor) = self.custom.get(&config.enhancer_type) {
            return constructor(config, aspects);
        }

        match config.enhancer_type.as_str() {
            "Simple" => Ok(Arc::new(SimpleEnhancer::from_config(config, aspects)?)),
            "Plugin" => Ok(Arc::new(PluginEnhancer::from_config(config, aspects)?)),
            "PageType" => Ok(Arc::new(PageTypeDecorator::from_config(config)?)),
            other => Err(RoutingError::UnknownEnhancerType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enhancer_type: &str) -> EnhancerConfig {
        EnhancerConfig {
            name: "e".into(),
            enhancer_type: enhancer_type.into(),
            route_path: Some("/{a}".into()),
            namespace: Some("tx_a".into()),
            ..EnhancerConfig::default()
        }
    }

    #[test]
    fn test_builtin_capabilities() {
        let factory = EnhancerFactory::new();

        let simple = factory.create(&config("Simple"), BTreeMap::new()).unwrap();
        assert!(simple.as_routing().is_some());
        assert!(simple.as_resulting().is_some());
        assert!(simple.as_decorating().is_none());

        let page_type = factory.create(&config("PageType"), BTreeMap::new()).unwrap();
        assert!(page_type.as_decorating().is_some());
        assert!(page_type.as_routing().is_none());

        assert!(matches!(
            factory.create(&config("Extbase"), BTreeMap::new()),
            Err(RoutingError::UnknownEnhancerType(_))
        ));
    }

    #[test]
    fn test_custom_type_overrides() {
        #[derive(Debug)]
        struct Marker;
        impl Enhancer for Marker {
            fn name(&self) -> &str {
                "marker"
            }
        }

        let mut factory = EnhancerFactory::new();
        factory.register("Simple", |_, _| Ok(Arc::new(Marker) as Arc<dyn Enhancer>));
        assert!(factory.supports("Simple"));
        assert!(!factory.supports("Extbase"));

        let enhancer = factory.create(&config("Simple"), BTreeMap::new()).unwrap();
        assert_eq!(enhancer.name(), "marker");
        assert!(enhancer.as_routing().is_none());
    }
}
