//! Route candidates and path pattern compilation.
//!
//! # Responsibilities
//! - Hold one path pattern with its defaults, requirements and aspects
//! - Remember the page (and enhancer) the pattern belongs to
//! - Compile `{variable}` placeholders into an anchored regex
//! - Substitute parameters back into the pattern for generation
//!
//! # Design Decisions
//! - Placeholders capture `[^/]+` unless a requirement says otherwise
//! - Trailing placeholders with defaults are optional in both directions
//! - Pattern size is bounded so configuration cannot build huge automata
//! - Values are percent-encoded into their segment on generation and
//!   decoded again when captured

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aspect::{Aspect, AspectCapability};
use crate::enhancer::Enhancer;
use crate::routing::types::{Parameters, RoutingError, RoutingResult};
use crate::site::PageRecord;

/// Requirement applied to variables without an explicit one.
pub const DEFAULT_REQUIREMENT: &str = "[^/]+";

/// Characters that may separate a placeholder from the preceding text.
const SEPARATORS: &[char] = &['/', '.', '-', '_', ','];

/// Maximum allowed length for a route path in bytes.
const MAX_ROUTE_PATH_LENGTH: usize = 2048;

/// Maximum allowed size for a compiled route regex (in bytes).
const MAX_ROUTE_REGEX_SIZE: usize = 1 << 20;

/// Bytes escaped when a parameter value is written into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A parsed piece of a route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Variable { separator: Option<char>, name: String },
}

/// A route pattern bound to a page.
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    defaults: Parameters,
    requirements: BTreeMap<String, String>,
    aspects: BTreeMap<String, Arc<dyn Aspect>>,
    page: PageRecord,
    enhancer: Option<Arc<dyn Enhancer>>,
    deflated_parameters: Option<Parameters>,
    decorated_path: Option<String>,
    decorated_parameters: Parameters,
}

impl Route {
    /// The plain slug route of a page.
    pub fn for_page(page: PageRecord) -> Self {
        Self {
            path: page.route_path(),
            defaults: Parameters::new(),
            requirements: BTreeMap::new(),
            aspects: BTreeMap::new(),
            page,
            enhancer: None,
            deflated_parameters: None,
            decorated_path: None,
            decorated_parameters: Parameters::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn page(&self) -> &PageRecord {
        &self.page
    }

    pub fn defaults(&self) -> &Parameters {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: Parameters) {
        self.defaults = defaults;
    }

    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }

    pub fn set_requirements(&mut self, requirements: BTreeMap<String, String>) {
        self.requirements = requirements;
    }

    /// Requirement of a variable, falling back to `DEFAULT_REQUIREMENT`.
    pub fn requirement(&self, variable: &str) -> &str {
        self.requirements
            .get(variable)
            .map(String::as_str)
            .unwrap_or(DEFAULT_REQUIREMENT)
    }

    pub fn aspects(&self) -> &BTreeMap<String, Arc<dyn Aspect>> {
        &self.aspects
    }

    pub fn set_aspects(&mut self, aspects: BTreeMap<String, Arc<dyn Aspect>>) {
        self.aspects = aspects;
    }

    /// Aspects bound to `variable_names` whose capability passes `filter`.
    pub fn filter_aspects<'a>(
        &'a self,
        filter: impl Fn(&AspectCapability) -> bool,
        variable_names: &[String],
    ) -> Vec<(&'a str, &'a Arc<dyn Aspect>)> {
        self.aspects
            .iter()
            .filter(|(name, _)| variable_names.contains(name))
            .filter(|(_, aspect)| filter(&aspect.capability()))
            .map(|(name, aspect)| (name.as_str(), aspect))
            .collect()
    }

    pub fn enhancer(&self) -> Option<&Arc<dyn Enhancer>> {
        self.enhancer.as_ref()
    }

    pub fn set_enhancer(&mut self, enhancer: Arc<dyn Enhancer>) {
        self.enhancer = Some(enhancer);
    }

    /// Parameters prepared for this route by its enhancers during generation.
    pub fn deflated_parameters(&self) -> Option<&Parameters> {
        self.deflated_parameters.as_ref()
    }

    pub fn set_deflated_parameters(&mut self, parameters: Parameters) {
        self.deflated_parameters = Some(parameters);
    }

    /// Request path with decorations (e.g. a `.json` suffix) stripped.
    pub fn decorated_path(&self) -> Option<&str> {
        self.decorated_path.as_deref()
    }

    pub fn set_decorated_path(&mut self, path: impl Into<String>) {
        self.decorated_path = Some(path.into());
    }

    /// Parameters recovered from decorations rather than path segments.
    pub fn decorated_parameters(&self) -> &Parameters {
        &self.decorated_parameters
    }

    pub fn set_decorated_parameters(&mut self, parameters: Parameters) {
        self.decorated_parameters = parameters;
    }

    /// Compile the path pattern.
    pub fn compile(&self) -> RoutingResult<CompiledRoute> {
        CompiledRoute::compile(self)
    }
}

/// A route path compiled for matching and generation.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    regex: Regex,
    tokens: Vec<Token>,
    variables: Vec<String>,
    requirements: BTreeMap<String, Regex>,
}

impl CompiledRoute {
    fn compile(route: &Route) -> RoutingResult<Self> {
        let invalid = |reason: String| RoutingError::InvalidRoute {
            path: route.path.clone(),
            reason,
        };

        if route.path.len() > MAX_ROUTE_PATH_LENGTH {
            return Err(invalid(format!(
                "path length {} exceeds maximum of {} bytes",
                route.path.len(),
                MAX_ROUTE_PATH_LENGTH
            )));
        }

        let tokens = tokenize(&route.path).map_err(invalid)?;
        let variables: Vec<String> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Variable { name, .. } => Some(name.clone()),
                Token::Text(_) => None,
            })
            .collect();

        let build = |pattern: &str| {
            RegexBuilder::new(pattern)
                .size_limit(MAX_ROUTE_REGEX_SIZE)
                .build()
                .map_err(|e| invalid(format!("failed to compile pattern regex: {}", e)))
        };

        let mut requirements = BTreeMap::new();
        for name in &variables {
            let requirement = route.requirement(name);
            // A requirement must parse on its own, or it could close the
            // group it is embedded in.
            build(requirement)?;
            requirements.insert(name.clone(), build(&format!("^(?:{})$", requirement))?);
        }

        let regex = build(&build_regex(route, &tokens))?;

        Ok(Self {
            regex,
            tokens,
            variables,
            requirements,
        })
    }

    /// Variable names in pattern order.
    pub fn path_variables(&self) -> &[String] {
        &self.variables
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Captured variable values if `path` matches the whole pattern.
    ///
    /// `path` keeps `%` and `/` escaped inside segments; captured values are
    /// decoded.
    pub fn captures(&self, path: &str) -> Option<Parameters> {
        let caps = self.regex.captures(path)?;
        Some(
            self.variables
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), percent_decode_str(m.as_str()).decode_utf8_lossy().into_owned()))
                })
                .collect(),
        )
    }

    /// Substitute `parameters` into the pattern.
    ///
    /// Returns the path and the parameters that were not consumed by a
    /// variable (and differ from the route defaults).
    pub fn generate(&self, route: &Route, parameters: &Parameters) -> Result<(String, Parameters), GenerateError> {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();
        for name in &self.variables {
            match parameters.get(name).or_else(|| route.defaults.get(name)) {
                Some(value) => {
                    values.insert(name.as_str(), value.as_str());
                }
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(GenerateError::MissingParameters(missing));
        }

        for (name, value) in &values {
            let accepted = self
                .requirements
                .get(*name)
                .map(|requirement| requirement.is_match(value))
                .unwrap_or(false);
            if !accepted {
                return Err(GenerateError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        // Trailing variables equal to their default are left out.
        let mut path = String::new();
        let mut optional = true;
        for token in self.tokens.iter().rev() {
            match token {
                Token::Text(text) => {
                    path.insert_str(0, text);
                    optional = false;
                }
                Token::Variable { separator, name } => {
                    let value = values[name.as_str()];
                    let is_default = route.defaults.get(name).map(|d| d == value).unwrap_or(false);
                    if !optional || !is_default {
                        path.insert_str(0, &utf8_percent_encode(value, SEGMENT).to_string());
                        if let Some(separator) = separator {
                            path.insert(0, *separator);
                        }
                        optional = false;
                    }
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let extra = parameters
            .iter()
            .filter(|(key, _)| !self.variables.contains(key))
            .filter(|(key, value)| route.defaults.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok((path, extra))
    }
}

/// Why a route could not be generated from a parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Mandatory variables had neither a parameter nor a default.
    MissingParameters(Vec<String>),
    /// A value does not satisfy the variable's requirement.
    InvalidParameter { name: String, value: String },
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::MissingParameters(names) => {
                write!(f, "Missing mandatory parameters: {}", names.join(", "))
            }
            GenerateError::InvalidParameter { name, value } => {
                write!(f, "Parameter '{}' does not accept '{}'", name, value)
            }
        }
    }
}

/// Split a route path into text and variable tokens.
pub fn tokenize(path: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        if c == '}' {
            return Err("unexpected '}'".into());
        }
        if c != '{' {
            text.push(c);
            continue;
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some('{') | None => return Err(format!("unclosed placeholder '{{{}'", name)),
                Some(next) => name.push(next),
            }
        }
        if !is_valid_variable_name(&name) {
            return Err(format!("invalid variable name '{}'", name));
        }
        let duplicate = tokens
            .iter()
            .any(|t| matches!(t, Token::Variable { name: existing, .. } if *existing == name));
        if duplicate {
            return Err(format!("variable '{}' is used more than once", name));
        }

        let separator = match text.chars().last() {
            Some(last) if SEPARATORS.contains(&last) => {
                text.pop();
                Some(last)
            }
            _ => None,
        };
        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }
        tokens.push(Token::Variable { separator, name });
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

/// Identifiers only; they double as regex group names.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn build_regex(route: &Route, tokens: &[Token]) -> String {
    let mut first_optional = tokens.len();
    for (index, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Variable { name, .. } if route.defaults.contains_key(name) => first_optional = index,
            _ => break,
        }
    }

    let token_regex = |token: &Token| match token {
        Token::Text(text) => regex::escape(text),
        Token::Variable { separator, name } => format!(
            "{}(?P<{}>{})",
            separator.map(|s| regex::escape(&s.to_string())).unwrap_or_default(),
            name,
            route.requirement(name)
        ),
    };

    let mut body = String::new();
    for token in &tokens[..first_optional] {
        body.push_str(&token_regex(token));
    }
    let optional = &tokens[first_optional..];
    for token in optional {
        body.push_str("(?:");
        body.push_str(&token_regex(token));
    }
    body.push_str(&")?".repeat(optional.len()));

    if first_optional == 0 && !optional.is_empty() {
        // nothing but optional variables: the bare root must still match
        format!("^(?:{}|/)$", body)
    } else {
        format!("^{}$", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route {
        let mut route = Route::for_page(PageRecord::new(10, 1, "/news"));
        route.set_path(path);
        route
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("/news/{news}/page-{page}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("/news".into()),
                Token::Variable { separator: Some('/'), name: "news".into() },
                Token::Text("/page".into()),
                Token::Variable { separator: Some('-'), name: "page".into() },
            ]
        );

        assert!(tokenize("/news/{news").is_err());
        assert!(tokenize("/news/{a}/{a}").is_err());
        assert!(tokenize("/news/{a-b}").is_err());
        assert!(tokenize("/news/}").is_err());
    }

    #[test]
    fn test_plain_slug_matches_exactly() {
        let compiled = route("/news").compile().unwrap();
        assert!(compiled.captures("/news").is_some());
        assert!(compiled.captures("/news/42").is_none());
        assert!(compiled.captures("/newsletter").is_none());
        assert!(compiled.path_variables().is_empty());
    }

    #[test]
    fn test_captures_with_requirements() {
        let mut route = route("/news/{id}");
        route.set_requirements(BTreeMap::from([("id".to_string(), "\\d+".to_string())]));
        let compiled = route.compile().unwrap();

        assert_eq!(compiled.captures("/news/42"), Some(params(&[("id", "42")])));
        assert!(compiled.captures("/news/abc").is_none());
        assert!(compiled.captures("/news/42/43").is_none());
    }

    #[test]
    fn test_optional_trailing_variable() {
        let mut route = route("/news/{id}/{page}");
        route.set_defaults(params(&[("page", "1")]));
        let compiled = route.compile().unwrap();

        assert_eq!(compiled.captures("/news/42"), Some(params(&[("id", "42")])));
        assert_eq!(compiled.captures("/news/42/3"), Some(params(&[("id", "42"), ("page", "3")])));

        let (path, _) = compiled.generate(&route, &params(&[("id", "42"), ("page", "1")])).unwrap();
        assert_eq!(path, "/news/42");
        let (path, _) = compiled.generate(&route, &params(&[("id", "42"), ("page", "2")])).unwrap();
        assert_eq!(path, "/news/42/2");
    }

    #[test]
    fn test_only_optional_variables_on_root() {
        let mut route = route("/{page}");
        route.set_defaults(params(&[("page", "1")]));
        let compiled = route.compile().unwrap();

        assert!(compiled.captures("/").is_some());
        assert_eq!(compiled.captures("/4"), Some(params(&[("page", "4")])));
        let (path, _) = compiled.generate(&route, &params(&[])).unwrap();
        assert_eq!(path, "/");
    }

    #[test]
    fn test_generate_errors_and_extra_parameters() {
        let mut route = route("/news/{id}");
        route.set_requirements(BTreeMap::from([("id".to_string(), "\\d+".to_string())]));
        let compiled = route.compile().unwrap();

        assert_eq!(
            compiled.generate(&route, &params(&[])),
            Err(GenerateError::MissingParameters(vec!["id".into()]))
        );
        assert!(matches!(
            compiled.generate(&route, &params(&[("id", "x")])),
            Err(GenerateError::InvalidParameter { .. })
        ));

        let (path, extra) = compiled
            .generate(&route, &params(&[("id", "42"), ("foo", "bar")]))
            .unwrap();
        assert_eq!(path, "/news/42");
        assert_eq!(extra, params(&[("foo", "bar")]));
    }

    #[test]
    fn test_regex_metacharacters_in_slug_are_literal() {
        let compiled = route("/c++/faq").compile().unwrap();
        assert!(compiled.captures("/c++/faq").is_some());
        assert!(compiled.captures("/cc/faq").is_none());
    }

    #[test]
    fn test_invalid_requirement() {
        let mut route = route("/news/{id}");
        route.set_requirements(BTreeMap::from([("id".to_string(), "(".to_string())]));
        assert!(matches!(route.compile(), Err(RoutingError::InvalidRoute { .. })));
    }

    #[test]
    fn test_requirement_cannot_close_its_group() {
        let mut route = route("/news/{id}");
        route.set_requirements(BTreeMap::from([("id".to_string(), "a)|(b".to_string())]));
        assert!(matches!(route.compile(), Err(RoutingError::InvalidRoute { .. })));
    }

    #[test]
    fn test_values_are_encoded_into_their_segment() {
        let route = route("/news/{id}");
        let compiled = route.compile().unwrap();

        let (path, _) = compiled.generate(&route, &params(&[("id", "a%2Fb")])).unwrap();
        assert_eq!(path, "/news/a%252Fb");
        let (path, _) = compiled.generate(&route, &params(&[("id", "50% off?")])).unwrap();
        assert_eq!(path, "/news/50%25%20off%3F");

        assert_eq!(compiled.captures("/news/a%252Fb"), Some(params(&[("id", "a%2Fb")])));
        assert_eq!(compiled.captures("/news/a%2Fb"), Some(params(&[("id", "a/b")])));

        // A raw slash still breaks the default requirement.
        assert!(matches!(
            compiled.generate(&route, &params(&[("id", "a/b")])),
            Err(GenerateError::InvalidParameter { .. })
        ));
    }
}
