//! Routing types and error definitions.

use std::collections::BTreeMap;
use thiserror::Error;

/// Flat parameter mapping.
///
/// Namespaced parameters use bracket keys (`tx_news[id]`). Sorted order keeps
/// generated query strings and cache hashes deterministic.
pub type Parameters = BTreeMap<String, String>;

/// Upper bound for the product of all static, countable aspect sizes bound to
/// one route.
pub const MAX_STATIC_MAPPABLE_PRODUCT: u64 = 10_000;

/// Errors that can occur while resolving or generating page routes.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Static mappers of a route span too many combinations.
    #[error("Possible range of all mappers is larger than {max} items (got {product})", max = MAX_STATIC_MAPPABLE_PRODUCT)]
    StaticMappableOverflow { product: u64 },

    /// A generated result still carries unprocessed arguments.
    #[error("Route arguments are dirty for page {page_id}")]
    DirtyArguments { page_id: u32 },

    /// No route candidate could be generated from the given parameters.
    #[error("Cannot generate URI for page {page_id}: no route candidate accepted the parameters")]
    CannotGenerate { page_id: u32 },

    /// The referenced page does not exist in this site and language.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// The requested language is not configured for this site.
    #[error("Language {0} is not configured for this site")]
    UnknownLanguage(u32),

    /// A route path could not be compiled.
    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    /// An aspect could not be constructed.
    #[error("Invalid aspect '{name}': {reason}")]
    InvalidAspect { name: String, reason: String },

    /// No aspect constructor is registered for this type.
    #[error("Unknown aspect type '{0}'")]
    UnknownAspectType(String),

    /// No enhancer constructor is registered for this type.
    #[error("Unknown enhancer type '{0}'")]
    UnknownEnhancerType(String),

    /// An enhancer is missing configuration required by its type.
    #[error("Invalid enhancer '{name}': {reason}")]
    InvalidEnhancer { name: String, reason: String },

    /// Two enhancers contribute the same parameter for one page.
    #[error("Parameter '{parameter}' is contributed by more than one enhancer")]
    AmbiguousDecoration { parameter: String },

    /// A reserved parameter has an unusable value.
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: String, value: String },

    /// Site or language settings cannot be used for routing.
    #[error("Invalid site configuration: {0}")]
    InvalidSite(String),

    /// Page or alias storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
