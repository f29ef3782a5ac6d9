//! Page records.

use serde::{Deserialize, Serialize};

/// A page row as returned by the page finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page uid.
    pub uid: u32,

    /// Parent page uid (0 = none).
    #[serde(default)]
    pub pid: u32,

    /// Uid of the default language page if this row is a translation.
    #[serde(default)]
    pub l10n_parent: Option<u32>,

    /// Language of this row.
    #[serde(default)]
    pub language_id: u32,

    /// Slug, e.g. "/about-us/team".
    pub slug: String,
}

impl PageRecord {
    /// Create a default language page.
    pub fn new(uid: u32, pid: u32, slug: impl Into<String>) -> Self {
        Self {
            uid,
            pid,
            l10n_parent: None,
            language_id: 0,
            slug: slug.into(),
        }
    }

    /// Create a translation of `parent` in `language_id`.
    pub fn translation(uid: u32, parent: &PageRecord, language_id: u32, slug: impl Into<String>) -> Self {
        Self {
            uid,
            pid: parent.pid,
            l10n_parent: Some(parent.uid),
            language_id,
            slug: slug.into(),
        }
    }

    /// The page id in the default language.
    ///
    /// Translations always expose their parent's id.
    pub fn default_language_uid(&self) -> u32 {
        match self.l10n_parent {
            Some(parent) if parent > 0 => parent,
            _ => self.uid,
        }
    }

    /// The slug as a route path: one leading `/`, no trailing `/` except
    /// for the root.
    pub fn route_path(&self) -> String {
        format!("/{}", self.slug.trim_matches('/'))
    }
}
