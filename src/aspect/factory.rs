//! Aspect construction from configuration.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{AliasStore, Aspect, PersistedAliasMapper, StaticRangeMapper, StaticValueMapper};
use crate::config::schema::AspectConfig;
use crate::routing::types::{RoutingError, RoutingResult};
use crate::site::SiteLanguage;

type AspectConstructor =
    Box<dyn Fn(&str, &AspectConfig, &SiteLanguage) -> RoutingResult<Arc<dyn Aspect>> + Send + Sync>;

/// Creates aspects for one site language.
///
/// Built-in types are always available; custom types are registered up front
/// and take precedence over built-ins of the same name.
#[derive(Default)]
pub struct AspectFactory {
    custom: HashMap<String, AspectConstructor>,
    alias_store: Option<Arc<dyn AliasStore>>,
}

impl std::fmt::Debug for AspectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectFactory")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("alias_store", &self.alias_store.is_some())
            .finish()
    }
}

impl AspectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `store` for `PersistedAliasMapper` aspects.
    pub fn with_alias_store(mut self, store: Arc<dyn AliasStore>) -> Self {
        self.alias_store = Some(store);
        self
    }

    /// Register a constructor for a custom aspect type.
    pub fn register<F>(&mut self, aspect_type: impl Into<String>, constructor: F)
    where
        F: Fn(&str, &AspectConfig, &SiteLanguage) -> RoutingResult<Arc<dyn Aspect>> + Send + Sync + 'static,
    {
        self.custom.insert(aspect_type.into(), Box::new(constructor));
    }

    /// Create all aspects of an enhancer, keyed by route variable name.
    pub fn create_aspects(
        &self,
        configs: &BTreeMap<String, AspectConfig>,
        language: &SiteLanguage,
    ) -> RoutingResult<BTreeMap<String, Arc<dyn Aspect>>> {
        configs
            .iter()
            .map(|(name, config)| {
                self.create(name, config, language)
                    .map(|aspect| (name.clone(), aspect))
            })
            .collect()
    }

    fn create(&self, name: &str, config: &AspectConfig, language: &SiteLanguage) -> RoutingResult<Arc<dyn Aspect>> {
        if let Some(constructor) = self.custom.get(&config.aspect_type) {
            return constructor(name, config, language);
        }

        let missing = |field: &str| RoutingError::InvalidAspect {
            name: name.to_string(),
            reason: format!("missing '{}'", field),
        };

        match config.aspect_type.as_str() {
            "StaticRangeMapper" => {
                let start = config.start.as_deref().ok_or_else(|| missing("start"))?;
                let end = config.end.as_deref().ok_or_else(|| missing("end"))?;
                Ok(Arc::new(StaticRangeMapper::new(name, start, end)?))
            }
            "StaticValueMapper" => Ok(Arc::new(StaticValueMapper::with_locale(
                &config.map,
                &config.locale_map,
                language.locale(),
            ))),
            "PersistedAliasMapper" => {
                let store = self.alias_store.clone().ok_or_else(|| RoutingError::InvalidAspect {
                    name: name.to_string(),
                    reason: "no alias store available".into(),
                })?;
                let table = config.table_name.clone().ok_or_else(|| missing("table_name"))?;
                let field = config.route_field_name.clone().ok_or_else(|| missing("route_field_name"))?;
                Ok(Arc::new(PersistedAliasMapper::new(store, table, field, language.language_id())))
            }
            other => Err(RoutingError::UnknownAspectType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::{AspectCapability, InMemoryAliasStore};
    use url::Url;

    fn language() -> SiteLanguage {
        SiteLanguage::new(0, Url::parse("https://example.com/").unwrap(), "en_US.UTF-8")
    }

    fn range(start: &str, end: &str) -> AspectConfig {
        AspectConfig {
            aspect_type: "StaticRangeMapper".into(),
            start: Some(start.into()),
            end: Some(end.into()),
            ..AspectConfig::default()
        }
    }

    #[test]
    fn test_builtin_types() {
        let factory = AspectFactory::new().with_alias_store(Arc::new(InMemoryAliasStore::default()));
        let configs = BTreeMap::from([
            ("page".to_string(), range("1", "10")),
            (
                "news".to_string(),
                AspectConfig {
                    aspect_type: "PersistedAliasMapper".into(),
                    table_name: Some("tx_news".into()),
                    route_field_name: Some("path_segment".into()),
                    ..AspectConfig::default()
                },
            ),
        ]);

        let aspects = factory.create_aspects(&configs, &language()).unwrap();
        assert_eq!(aspects["page"].capability().count(), Some(10));
        assert_eq!(aspects["news"].capability(), AspectCapability::StaticMappable { count: None });
    }

    #[test]
    fn test_missing_fields_and_unknown_type() {
        let factory = AspectFactory::new();
        let mut config = range("1", "10");
        config.end = None;
        let err = factory
            .create_aspects(&BTreeMap::from([("page".to_string(), config)]), &language())
            .unwrap_err();
        assert!(err.to_string().contains("missing 'end'"));

        let unknown = AspectConfig {
            aspect_type: "Nope".into(),
            ..AspectConfig::default()
        };
        assert!(matches!(
            factory.create_aspects(&BTreeMap::from([("x".to_string(), unknown)]), &language()),
            Err(RoutingError::UnknownAspectType(_))
        ));
    }

    #[test]
    fn test_alias_mapper_requires_store() {
        let config = AspectConfig {
            aspect_type: "PersistedAliasMapper".into(),
            table_name: Some("tx_news".into()),
            route_field_name: Some("path_segment".into()),
            ..AspectConfig::default()
        };
        let err = AspectFactory::new()
            .create_aspects(&BTreeMap::from([("news".to_string(), config)]), &language())
            .unwrap_err();
        assert!(err.to_string().contains("alias store"));
    }

    #[test]
    fn test_custom_type() {
        #[derive(Debug)]
        struct Lowercase;
        impl Aspect for Lowercase {
            fn generate(&self, value: &str) -> RoutingResult<Option<String>> {
                Ok(Some(value.to_lowercase()))
            }
            fn resolve(&self, value: &str) -> RoutingResult<Option<String>> {
                Ok(Some(value.to_string()))
            }
            fn capability(&self) -> AspectCapability {
                AspectCapability::Dynamic
            }
        }

        let mut factory = AspectFactory::new();
        factory.register("Lowercase", |_, _, _| Ok(Arc::new(Lowercase) as Arc<dyn Aspect>));
        let config = AspectConfig {
            aspect_type: "Lowercase".into(),
            ..AspectConfig::default()
        };
        let aspects = factory
            .create_aspects(&BTreeMap::from([("tag".to_string(), config)]), &language())
            .unwrap();
        assert_eq!(aspects["tag"].generate("ABC").unwrap(), Some("abc".to_string()));
    }
}
