//! Route variable name translation.
//!
//! Route variables are regex group names, so namespaced arguments are
//! flattened: with namespace `tx_news` and arguments `{news_title = "news"}`
//! the placeholder `{news_title}` becomes `{tx_news__news}`, which inflates
//! back to the parameter key `tx_news[news]`.

use std::collections::BTreeMap;

use crate::routing::types::Parameters;

/// Joins a namespace and an argument name in deflated form.
pub const NAMESPACE_DELIMITER: &str = "__";

/// Translates between route variable names and parameter keys for one
/// enhancer.
#[derive(Debug, Clone, Copy)]
pub struct VariableProcessor<'a> {
    namespace: Option<&'a str>,
    arguments: &'a BTreeMap<String, String>,
}

impl<'a> VariableProcessor<'a> {
    pub fn new(namespace: Option<&'a str>, arguments: &'a BTreeMap<String, String>) -> Self {
        Self { namespace, arguments }
    }

    /// Route variable as written in configuration -> compiled variable name.
    pub fn deflate_variable(&self, variable: &str) -> String {
        let argument = self.arguments.get(variable).map(String::as_str).unwrap_or(variable);
        match self.namespace {
            Some(namespace) => format!("{}{}{}", namespace, NAMESPACE_DELIMITER, argument),
            None => argument.to_string(),
        }
    }

    /// Replace every `{variable}` placeholder with its deflated name.
    pub fn deflate_route_path(&self, route_path: &str) -> String {
        let mut deflated = String::with_capacity(route_path.len());
        let mut rest = route_path;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            deflated.push_str(&rest[..open]);
            deflated.push('{');
            deflated.push_str(&self.deflate_variable(&rest[open + 1..open + close]));
            deflated.push('}');
            rest = &rest[open + close + 1..];
        }
        deflated.push_str(rest);
        deflated
    }

    /// Deflate the keys of a per-variable map (defaults, requirements, aspects).
    pub fn deflate_keys<V: Clone>(&self, map: &BTreeMap<String, V>) -> BTreeMap<String, V> {
        map.iter()
            .map(|(key, value)| (self.deflate_variable(key), value.clone()))
            .collect()
    }

    /// Compiled variable name -> parameter key.
    pub fn inflate_name(&self, name: &str) -> String {
        if let Some(namespace) = self.namespace {
            let prefix = format!("{}{}", namespace, NAMESPACE_DELIMITER);
            if let Some(argument) = name.strip_prefix(&prefix) {
                return format!("{}[{}]", namespace, argument);
            }
        }
        name.to_string()
    }

    /// Parameter key -> compiled variable name.
    ///
    /// Keys outside the namespace are returned unchanged.
    pub fn deflate_name(&self, key: &str) -> String {
        if let Some(namespace) = self.namespace {
            let argument = key
                .strip_prefix(namespace)
                .and_then(|rest| rest.strip_prefix('['))
                .and_then(|rest| rest.strip_suffix(']'));
            if let Some(argument) = argument {
                return format!("{}{}{}", namespace, NAMESPACE_DELIMITER, argument);
            }
        }
        key.to_string()
    }

    pub fn inflate_parameters(&self, parameters: &Parameters) -> Parameters {
        parameters
            .iter()
            .map(|(key, value)| (self.inflate_name(key), value.clone()))
            .collect()
    }

    /// Deflate the parameters that are route variables; keep all others as
    /// given so they end up in the query string unchanged.
    pub fn deflate_parameters(&self, parameters: &Parameters, variables: &[String]) -> Parameters {
        parameters
            .iter()
            .map(|(key, value)| {
                let deflated = self.deflate_name(key);
                if variables.contains(&deflated) {
                    (deflated, value.clone())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }

    /// Whether `parameters` contain anything in this processor's namespace.
    pub fn has_namespace_parameters(&self, parameters: &Parameters) -> bool {
        match self.namespace {
            Some(namespace) => parameters
                .keys()
                .any(|key| key.strip_prefix(namespace).is_some_and(|rest| rest.starts_with('['))),
            None => !parameters.is_empty(),
        }
    }
}
