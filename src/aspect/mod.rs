//! Aspects: value mappings bound to route variables.
//!
//! # Data Flow
//! ```text
//! Matching:   path segment → Aspect::resolve → parameter value
//! Generation: parameter value → Aspect::generate → path segment
//! ```
//!
//! # Design Decisions
//! - Capabilities are data (`AspectCapability`), not a type hierarchy
//! - Static aspects map 1:1 and make an argument static (no cHash needed)
//! - Countable static aspects feed the keyspace overflow guard
//! - A mapping miss is `Ok(None)`; `Err` is reserved for storage failures

pub mod factory;
pub mod persisted_alias;
pub mod static_range;
pub mod static_value;

use std::fmt;

use crate::routing::types::RoutingResult;

pub use factory::AspectFactory;
pub use persisted_alias::{AliasStore, InMemoryAliasStore, PersistedAliasMapper};
pub use static_range::StaticRangeMapper;
pub use static_value::StaticValueMapper;

/// What an aspect guarantees about its mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectCapability {
    /// Reversible 1:1 mapping. `count` is set when the value set is enumerable.
    StaticMappable { count: Option<u64> },
    /// Free-form values that cannot be enumerated.
    Dynamic,
}

impl AspectCapability {
    pub fn is_static(&self) -> bool {
        matches!(self, AspectCapability::StaticMappable { .. })
    }

    /// Size of the value set for static, countable aspects.
    pub fn count(&self) -> Option<u64> {
        match self {
            AspectCapability::StaticMappable { count } => *count,
            AspectCapability::Dynamic => None,
        }
    }
}

/// A named mapping between path segment values and parameter values.
pub trait Aspect: Send + Sync + fmt::Debug {
    /// Map a parameter value to its path segment.
    fn generate(&self, value: &str) -> RoutingResult<Option<String>>;

    /// Map a path segment back to its parameter value.
    fn resolve(&self, value: &str) -> RoutingResult<Option<String>>;

    fn capability(&self) -> AspectCapability;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability() {
        let countable = AspectCapability::StaticMappable { count: Some(12) };
        assert!(countable.is_static());
        assert_eq!(countable.count(), Some(12));

        let uncountable = AspectCapability::StaticMappable { count: None };
        assert!(uncountable.is_static());
        assert_eq!(uncountable.count(), None);

        assert!(!AspectCapability::Dynamic.is_static());
    }
}
