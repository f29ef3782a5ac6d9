//! Fixed value table mapper.

use std::collections::BTreeMap;

use super::{Aspect, AspectCapability};
use crate::config::schema::LocaleMapConfig;
use crate::routing::types::RoutingResult;

/// Maps path segments to values through a fixed table.
///
/// A locale specific table replaces the default one when its locale is a
/// prefix of the site language's locale.
#[derive(Debug, Clone)]
pub struct StaticValueMapper {
    /// Path segment -> parameter value.
    map: BTreeMap<String, String>,
}

impl StaticValueMapper {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self { map }
    }

    pub fn with_locale(map: &BTreeMap<String, String>, locale_maps: &[LocaleMapConfig], locale: &str) -> Self {
        let map = locale_maps
            .iter()
            .find(|candidate| !candidate.locale.is_empty() && locale.starts_with(&candidate.locale))
            .map(|candidate| candidate.map.clone())
            .unwrap_or_else(|| map.clone());
        Self { map }
    }
}

impl Aspect for StaticValueMapper {
    fn generate(&self, value: &str) -> RoutingResult<Option<String>> {
        Ok(self
            .map
            .iter()
            .find(|(_, mapped)| mapped.as_str() == value)
            .map(|(segment, _)| segment.clone()))
    }

    fn resolve(&self, value: &str) -> RoutingResult<Option<String>> {
        Ok(self.map.get(value).cloned())
    }

    fn capability(&self) -> AspectCapability {
        AspectCapability::StaticMappable { count: Some(self.map.len() as u64) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasons() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("spring".to_string(), "1".to_string()),
            ("summer".to_string(), "2".to_string()),
        ])
    }

    #[test]
    fn test_value_table() {
        let mapper = StaticValueMapper::new(seasons());
        assert_eq!(mapper.resolve("summer").unwrap(), Some("2".to_string()));
        assert_eq!(mapper.generate("1").unwrap(), Some("spring".to_string()));
        assert_eq!(mapper.generate("3").unwrap(), None);
        assert_eq!(mapper.capability().count(), Some(2));
    }

    #[test]
    fn test_locale_map() {
        let german = LocaleMapConfig {
            locale: "de_DE".into(),
            map: BTreeMap::from([("fruehling".to_string(), "1".to_string())]),
        };

        let mapper = StaticValueMapper::with_locale(&seasons(), &[german.clone()], "de_DE.UTF-8");
        assert_eq!(mapper.generate("1").unwrap(), Some("fruehling".to_string()));

        let mapper = StaticValueMapper::with_locale(&seasons(), &[german], "en_US.UTF-8");
        assert_eq!(mapper.generate("1").unwrap(), Some("spring".to_string()));
    }
}
