//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check languages, enhancer names and route paths
//! - Check that requirements compile and per-variable settings refer to
//!   variables of the route path
//! - Detect decorated parameters that collide with routing variables
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Unknown enhancer and aspect types are left to the factories, which may
//!   have custom types registered

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use regex::Regex;
use url::Url;

use crate::aspect::StaticRangeMapper;
use crate::config::schema::{EnhancerConfig, RouterConfig};
use crate::enhancer::{check_parameter_overlaps, EnhancerFactory};
use crate::observability::logging::LOG_LEVELS;
use crate::routing::route::{tokenize, Token};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending setting.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_languages(config, &mut errors);
    validate_pages(config, &mut errors);

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("must be one of {}", LOG_LEVELS.join(", ")),
        ));
    }

    let mut names = HashSet::new();
    for (index, enhancer) in config.site.route_enhancers.iter().enumerate() {
        let field = format!("site.route_enhancers[{}]", index);
        if enhancer.name.is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !names.insert(enhancer.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate enhancer name '{}'", enhancer.name),
            ));
        }
        validate_enhancer(&field, enhancer, &mut errors);
    }
    validate_overlaps(&config.site.route_enhancers, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_languages(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let site_base = match Url::parse(&config.site.base) {
        Ok(base) => Some(base),
        Err(e) => {
            errors.push(ValidationError::new("site.base", format!("invalid URL: {}", e)));
            None
        }
    };

    if config.site.languages.is_empty() {
        errors.push(ValidationError::new("site.languages", "at least one language is required"));
        return;
    }

    let mut ids = HashSet::new();
    for (index, language) in config.site.languages.iter().enumerate() {
        if !ids.insert(language.language_id) {
            errors.push(ValidationError::new(
                format!("site.languages[{}].language_id", index),
                format!("duplicate language id {}", language.language_id),
            ));
        }
        if let Some(base) = &site_base {
            if let Err(e) = base.join(&language.base) {
                errors.push(ValidationError::new(
                    format!("site.languages[{}].base", index),
                    format!("cannot be resolved against the site base: {}", e),
                ));
            }
        }
    }
    if !ids.contains(&0) {
        errors.push(ValidationError::new("site.languages", "default language 0 is missing"));
    }
}

fn validate_pages(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let mut rows = HashSet::new();
    for (index, page) in config.pages.iter().enumerate() {
        if !rows.insert((page.uid, page.language_id)) {
            errors.push(ValidationError::new(
                format!("pages[{}].uid", index),
                format!("duplicate page {} in language {}", page.uid, page.language_id),
            ));
        }
        if page.slug.is_empty() || !page.slug.starts_with('/') {
            errors.push(ValidationError::new(
                format!("pages[{}].slug", index),
                "must start with '/'",
            ));
        }
    }
}

fn validate_enhancer(field: &str, enhancer: &EnhancerConfig, errors: &mut Vec<ValidationError>) {
    match enhancer.enhancer_type.as_str() {
        "Simple" | "Plugin" => {}
        "PageType" => {
            for (suffix, page_type) in &enhancer.map {
                if suffix.is_empty() || page_type.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{}.map", field),
                        format!("invalid mapping '{}' -> '{}'", suffix, page_type),
                    ));
                }
            }
            return;
        }
        "" => {
            errors.push(ValidationError::new(format!("{}.type", field), "must not be empty"));
            return;
        }
        _ => return,
    }

    if enhancer.enhancer_type == "Plugin" && enhancer.namespace.as_deref().map(str::is_empty).unwrap_or(true) {
        errors.push(ValidationError::new(format!("{}.namespace", field), "required for Plugin enhancers"));
    }

    let Some(route_path) = &enhancer.route_path else {
        errors.push(ValidationError::new(format!("{}.route_path", field), "is required"));
        return;
    };
    if !route_path.starts_with('/') {
        errors.push(ValidationError::new(format!("{}.route_path", field), "must start with '/'"));
    }

    let variables: Vec<String> = match tokenize(route_path) {
        Ok(tokens) => tokens
            .into_iter()
            .filter_map(|token| match token {
                Token::Variable { name, .. } => Some(name),
                Token::Text(_) => None,
            })
            .collect(),
        Err(reason) => {
            errors.push(ValidationError::new(format!("{}.route_path", field), reason));
            return;
        }
    };

    check_variable_keys(field, "defaults", &enhancer.defaults, &variables, errors);
    check_variable_keys(field, "requirements", &enhancer.requirements, &variables, errors);
    check_variable_keys(field, "aspects", &enhancer.aspects, &variables, errors);

    for (name, requirement) in &enhancer.requirements {
        // Checked bare as well, since `a)|(b` only parses once wrapped.
        let compiled = Regex::new(requirement).and_then(|_| Regex::new(&format!("^(?:{})$", requirement)));
        if let Err(e) = compiled {
            errors.push(ValidationError::new(
                format!("{}.requirements.{}", field, name),
                format!("invalid regex: {}", e),
            ));
        }
    }

    for (name, aspect) in &enhancer.aspects {
        if aspect.aspect_type != "StaticRangeMapper" {
            continue;
        }
        let (Some(start), Some(end)) = (&aspect.start, &aspect.end) else {
            errors.push(ValidationError::new(
                format!("{}.aspects.{}", field, name),
                "StaticRangeMapper requires 'start' and 'end'",
            ));
            continue;
        };
        if let Err(e) = StaticRangeMapper::new(name, start, end) {
            errors.push(ValidationError::new(format!("{}.aspects.{}", field, name), e.to_string()));
        }
    }
}

fn check_variable_keys<V>(
    field: &str,
    setting: &str,
    map: &BTreeMap<String, V>,
    variables: &[String],
    errors: &mut Vec<ValidationError>,
) {
    for key in map.keys().filter(|key| !variables.contains(key)) {
        errors.push(ValidationError::new(
            format!("{}.{}.{}", field, setting, key),
            "does not refer to a variable of the route path",
        ));
    }
}

/// Enhancers that can apply to the same page must not share a decorated
/// parameter.
fn validate_overlaps(enhancers: &[EnhancerConfig], errors: &mut Vec<ValidationError>) {
    let factory = EnhancerFactory::new();
    let built: Vec<_> = enhancers
        .iter()
        .map(|config| factory.create(config, BTreeMap::new()).ok())
        .collect();

    for (i, first) in enhancers.iter().enumerate() {
        for (j, second) in enhancers.iter().enumerate().skip(i + 1) {
            if !limits_intersect(first.limit_to_pages.as_deref(), second.limit_to_pages.as_deref()) {
                continue;
            }
            let (Some(a), Some(b)) = (&built[i], &built[j]) else {
                continue;
            };
            if let Err(e) = check_parameter_overlaps(&[a.clone(), b.clone()]) {
                errors.push(ValidationError::new(
                    "site.route_enhancers",
                    format!("'{}' and '{}': {}", first.name, second.name, e),
                ));
            }
        }
    }
}

fn limits_intersect(a: Option<&[u32]>, b: Option<&[u32]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.iter().any(|page| b.contains(page)),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AspectConfig, LanguageConfig};

    fn enhancer(name: &str, enhancer_type: &str, route_path: Option<&str>) -> EnhancerConfig {
        EnhancerConfig {
            name: name.into(),
            enhancer_type: enhancer_type.into(),
            route_path: route_path.map(String::from),
            ..EnhancerConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_language_errors() {
        let mut config = RouterConfig::default();
        config.site.languages.push(LanguageConfig::default());
        config.site.languages[1].language_id = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("duplicate language id 0")));

        config.site.languages.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "site.languages");
    }

    #[test]
    fn test_collects_all_enhancer_errors() {
        let mut config = RouterConfig::default();
        let mut list = enhancer("list", "Simple", Some("{page}"));
        list.requirements.insert("page".into(), "(".into());
        list.defaults.insert("other".into(), "1".into());
        list.aspects.insert(
            "page".into(),
            AspectConfig {
                aspect_type: "StaticRangeMapper".into(),
                start: Some("1".into()),
                end: Some("5000".into()),
                ..AspectConfig::default()
            },
        );
        config.site.route_enhancers = vec![list, enhancer("list", "Plugin", Some("/{a}"))];

        let errors = validate_config(&config).unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("must start with '/'")));
        assert!(messages.iter().any(|m| m.contains("invalid regex")));
        assert!(messages.iter().any(|m| m.contains("defaults.other")));
        assert!(messages.iter().any(|m| m.contains("aspects.page")));
        assert!(messages.iter().any(|m| m.contains("duplicate enhancer name")));
        assert!(messages.iter().any(|m| m.contains("namespace")));
    }

    #[test]
    fn test_requirement_must_stand_alone() {
        let mut config = RouterConfig::default();
        let mut news = enhancer("news", "Simple", Some("/{id}"));
        news.requirements.insert("id".into(), "a)|(b".into());
        config.site.route_enhancers = vec![news];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "site.route_enhancers[0].requirements.id");
        assert!(errors[0].message.starts_with("invalid regex"));
    }

    #[test]
    fn test_overlaps_respect_page_limits() {
        let mut config = RouterConfig::default();
        let mut types = enhancer("types", "PageType", None);
        types.map.insert(".json".into(), "900".into());
        types.limit_to_pages = Some(vec![1]);
        let mut list = enhancer("list", "Simple", Some("/{type}"));
        list.limit_to_pages = Some(vec![2]);
        config.site.route_enhancers = vec![types.clone(), list.clone()];
        assert!(validate_config(&config).is_ok());

        list.limit_to_pages = None;
        config.site.route_enhancers = vec![types, list];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("'type'"));
    }
}
