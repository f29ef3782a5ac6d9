//! Integer range mapper.

use super::{Aspect, AspectCapability};
use crate::routing::types::{RoutingError, RoutingResult};

/// Largest range a single mapper may span.
pub const MAX_RANGE_ITEMS: u64 = 1_000;

/// Maps integers within `start..=end` onto themselves.
#[derive(Debug, Clone)]
pub struct StaticRangeMapper {
    start: i64,
    end: i64,
}

impl StaticRangeMapper {
    pub fn new(name: &str, start: &str, end: &str) -> RoutingResult<Self> {
        let parse = |value: &str| {
            value.trim().parse::<i64>().map_err(|_| RoutingError::InvalidAspect {
                name: name.to_string(),
                reason: format!("'{}' is not an integer", value),
            })
        };
        let (start, end) = (parse(start)?, parse(end)?);

        if start > end {
            return Err(RoutingError::InvalidAspect {
                name: name.to_string(),
                reason: format!("range start {} is greater than end {}", start, end),
            });
        }

        let mapper = Self { start, end };
        if mapper.size() > MAX_RANGE_ITEMS {
            return Err(RoutingError::InvalidAspect {
                name: name.to_string(),
                reason: format!("range is larger than {} items", MAX_RANGE_ITEMS),
            });
        }
        Ok(mapper)
    }

    pub fn size(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }

    /// Accept only canonical integers ("42", not "042" or "+42").
    fn lookup(&self, value: &str) -> Option<String> {
        let number: i64 = value.parse().ok()?;
        if number.to_string() != value || number < self.start || number > self.end {
            return None;
        }
        Some(value.to_string())
    }
}

impl Aspect for StaticRangeMapper {
    fn generate(&self, value: &str) -> RoutingResult<Option<String>> {
        Ok(self.lookup(value))
    }

    fn resolve(&self, value: &str) -> RoutingResult<Option<String>> {
        Ok(self.lookup(value))
    }

    fn capability(&self) -> AspectCapability {
        AspectCapability::StaticMappable { count: Some(self.size()) }
    }
}
