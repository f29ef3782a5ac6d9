//! Alias lookup mapper backed by persisted records.

use std::sync::Arc;

use super::{Aspect, AspectCapability};
use crate::config::schema::AliasRecord;
use crate::routing::types::RoutingResult;

/// Storage for record aliases (e.g. a news record's path segment).
pub trait AliasStore: Send + Sync {
    /// Field value of record `uid` in `language_id`, falling back to the
    /// default language row.
    fn alias_for(&self, table: &str, field: &str, uid: &str, language_id: u32) -> RoutingResult<Option<String>>;

    /// Uid (default language) of the record whose field equals `alias`.
    fn uid_for(&self, table: &str, field: &str, alias: &str, language_id: u32) -> RoutingResult<Option<String>>;
}

/// Maps record uids to the value of one of their fields.
#[derive(Clone)]
pub struct PersistedAliasMapper {
    store: Arc<dyn AliasStore>,
    table_name: String,
    route_field_name: String,
    language_id: u32,
}

impl std::fmt::Debug for PersistedAliasMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedAliasMapper")
            .field("table_name", &self.table_name)
            .field("route_field_name", &self.route_field_name)
            .field("language_id", &self.language_id)
            .finish()
    }
}

impl PersistedAliasMapper {
    pub fn new(
        store: Arc<dyn AliasStore>,
        table_name: impl Into<String>,
        route_field_name: impl Into<String>,
        language_id: u32,
    ) -> Self {
        Self {
            store,
            table_name: table_name.into(),
            route_field_name: route_field_name.into(),
            language_id,
        }
    }
}

impl Aspect for PersistedAliasMapper {
    fn generate(&self, value: &str) -> RoutingResult<Option<String>> {
        self.store
            .alias_for(&self.table_name, &self.route_field_name, value, self.language_id)
    }

    fn resolve(&self, value: &str) -> RoutingResult<Option<String>> {
        self.store
            .uid_for(&self.table_name, &self.route_field_name, value, self.language_id)
    }

    fn capability(&self) -> AspectCapability {
        AspectCapability::StaticMappable { count: None }
    }
}

/// Alias store over a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAliasStore {
    records: Vec<AliasRecord>,
}

impl InMemoryAliasStore {
    pub fn new(records: Vec<AliasRecord>) -> Self {
        Self { records }
    }

    fn field<'a>(record: &'a AliasRecord, field: &str) -> Option<&'a str> {
        record.fields.get(field).map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl AliasStore for InMemoryAliasStore {
    fn alias_for(&self, table: &str, field: &str, uid: &str, language_id: u32) -> RoutingResult<Option<String>> {
        let Ok(uid) = uid.parse::<u32>() else {
            return Ok(None);
        };
        let row = |language: u32| {
            self.records
                .iter()
                .filter(|r| r.table_name == table && r.uid == uid && r.language_id == language)
                .find_map(|r| Self::field(r, field))
        };

        Ok(row(language_id).or_else(|| row(0)).map(str::to_string))
    }

    fn uid_for(&self, table: &str, field: &str, alias: &str, language_id: u32) -> RoutingResult<Option<String>> {
        let row = |language: u32| {
            self.records
                .iter()
                .find(|r| r.table_name == table && r.language_id == language && Self::field(r, field) == Some(alias))
        };

        Ok(row(language_id).or_else(|| row(0)).map(|r| r.uid.to_string()))
    }
}
