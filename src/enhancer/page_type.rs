//! Page type decorator: maps path suffixes such as `.json` to a `type`
//! parameter.
//!
//! # Design Decisions
//! - Longer suffixes are tried first so `/feed.json` wins over `.json`
//! - The root page is addressed as `/{index}{suffix}` when a suffix applies
//! - A requested type without a mapped suffix stays a query parameter

use std::collections::BTreeMap;

use super::{Decoration, DecoratingEnhancer, Enhancer};
use crate::config::schema::EnhancerConfig;
use crate::routing::arguments::{DEFAULT_PAGE_TYPE, PAGE_TYPE_PARAMETER};
use crate::routing::collection::RouteCollection;
use crate::routing::types::{Parameters, RoutingError, RoutingResult};

/// Characters a suffix may start with; anything else is treated as a
/// separate path segment.
const SUFFIX_DELIMITERS: &[char] = &['.', '-', '_', '/'];

const DEFAULT_INDEX: &str = "index";

#[derive(Debug, Clone)]
pub struct PageTypeDecorator {
    name: String,
    default: String,
    index: String,
    /// (suffix, type), longest suffix first.
    suffixes: Vec<(String, String)>,
}

impl PageTypeDecorator {
    pub fn from_config(config: &EnhancerConfig) -> RoutingResult<Self> {
        let invalid = |reason: String| RoutingError::InvalidEnhancer {
            name: config.name.clone(),
            reason,
        };

        let mut suffixes = Vec::with_capacity(config.map.len());
        for (suffix, page_type) in &config.map {
            if suffix.is_empty() || page_type.is_empty() {
                return Err(invalid(format!("invalid mapping '{}' -> '{}'", suffix, page_type)));
            }
            suffixes.push((normalize_suffix(suffix), page_type.clone()));
        }
        suffixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let index = config.index.clone().unwrap_or_else(|| DEFAULT_INDEX.to_string());
        if index.contains('/') {
            return Err(invalid(format!("index '{}' must not contain '/'", index)));
        }

        Ok(Self {
            name: config.name.clone(),
            default: config.default.as_deref().map(normalize_suffix).unwrap_or_default(),
            index,
            suffixes,
        })
    }

    fn suffix_for(&self, page_type: &str) -> Option<&str> {
        self.suffixes
            .iter()
            .find(|(_, mapped)| mapped == page_type)
            .map(|(suffix, _)| suffix.as_str())
    }

    /// `route_path` without `suffix`, if it carries it.
    fn strip(&self, route_path: &str, suffix: &str) -> Option<String> {
        let stripped = route_path.strip_suffix(suffix)?;
        let root_index = format!("/{}", self.index);
        if stripped.is_empty() || stripped == root_index || stripped == self.index {
            return Some("/".to_string());
        }
        Some(stripped.to_string())
    }

    fn decorate(&self, route_path: &str, suffix: &str) -> String {
        let existing = route_path.trim_end_matches('/');
        if existing.is_empty() && !suffix.starts_with('/') {
            format!("/{}{}", self.index, suffix)
        } else {
            format!("{}{}", existing, suffix)
        }
    }
}

fn normalize_suffix(suffix: &str) -> String {
    if suffix.starts_with(SUFFIX_DELIMITERS) {
        suffix.to_string()
    } else {
        format!("/{}", suffix)
    }
}

impl Enhancer for PageTypeDecorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_decorating(&self) -> Option<&dyn DecoratingEnhancer> {
        Some(self)
    }
}

impl DecoratingEnhancer for PageTypeDecorator {
    fn decorate_for_matching(&self, route_path: &str) -> Decoration {
        for (suffix, page_type) in &self.suffixes {
            if let Some(stripped) = self.strip(route_path, suffix) {
                return Decoration {
                    route_path: Some(stripped),
                    parameters: BTreeMap::from([(PAGE_TYPE_PARAMETER.to_string(), page_type.clone())]),
                };
            }
        }
        if !self.default.is_empty() {
            if let Some(stripped) = self.strip(route_path, &self.default) {
                return Decoration {
                    route_path: Some(stripped),
                    parameters: Parameters::new(),
                };
            }
        }
        Decoration::default()
    }

    fn decorate_for_generation(&self, collection: &mut RouteCollection, parameters: &Parameters) {
        let requested = parameters.get(PAGE_TYPE_PARAMETER).map(String::as_str);
        let mapped = requested.and_then(|page_type| self.suffix_for(page_type));
        let consumed = mapped.is_some() || requested == Some(DEFAULT_PAGE_TYPE);
        let suffix = mapped.unwrap_or(self.default.as_str());

        for (_, route) in collection.iter_mut() {
            let mut deflated = route.deflated_parameters().cloned().unwrap_or_else(|| parameters.clone());
            if consumed {
                deflated.remove(PAGE_TYPE_PARAMETER);
            }
            if let (Some(page_type), Some(_)) = (requested, mapped) {
                route.set_decorated_parameters(Parameters::from([(
                    PAGE_TYPE_PARAMETER.to_string(),
                    page_type.to_string(),
                )]));
            }
            if !suffix.is_empty() {
                let decorated = self.decorate(route.path(), suffix);
                route.set_path(decorated);
            }
            route.set_deflated_parameters(deflated);
        }
    }

    fn parameter_names(&self) -> Vec<String> {
        vec![PAGE_TYPE_PARAMETER.to_string()]
    }
}
