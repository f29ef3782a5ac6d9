//! Page lookup contract.
//!
//! # Responsibilities
//! - Resolve slug candidates to page rows of one site and language
//! - Fetch a single page (with translation) for URL generation
//!
//! # Design Decisions
//! - Storage is a collaborator; the router only consumes this trait
//! - Results are ordered by slug descending so exact matches come first
//! - `InMemoryPageFinder` backs the CLI and the test suite

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::routing::types::RoutingResult;
use crate::site::page::PageRecord;

/// Looks up pages in the content tree of the current site.
pub trait PageFinder: Send + Sync {
    /// Pages whose slug is one of `candidates`, in `language_id`, restricted
    /// to the current site and ordered by slug descending.
    fn find_pages(&self, candidates: &[String], language_id: u32) -> RoutingResult<Vec<PageRecord>>;

    /// The page `page_id` (default language uid) in `language_id`, falling
    /// back to the default language row when no translation exists.
    fn find_page_by_id(&self, page_id: u32, language_id: u32) -> RoutingResult<Option<PageRecord>>;
}

/// Page finder over a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPageFinder {
    root_page_id: u32,
    pages: Vec<PageRecord>,
    /// Default language uid -> parent uid.
    parents: HashMap<u32, u32>,
}

impl InMemoryPageFinder {
    /// Create a finder for the tree below `root_page_id`.
    pub fn new(root_page_id: u32, pages: Vec<PageRecord>) -> Self {
        let parents = pages
            .iter()
            .filter(|p| p.l10n_parent.is_none())
            .map(|p| (p.uid, p.pid))
            .collect();

        Self {
            root_page_id,
            pages,
            parents,
        }
    }

    /// Walk up the tree until the root page is found.
    fn belongs_to_site(&self, page_id: u32) -> bool {
        let mut visited = HashSet::new();
        let mut current = page_id;
        loop {
            if current == self.root_page_id {
                return true;
            }
            if current == 0 || !visited.insert(current) {
                return false;
            }
            match self.parents.get(&current) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
    }
}

impl PageFinder for InMemoryPageFinder {
    fn find_pages(&self, candidates: &[String], language_id: u32) -> RoutingResult<Vec<PageRecord>> {
        let wanted: HashSet<&str> = candidates.iter().map(String::as_str).collect();

        let mut pages: Vec<PageRecord> = self
            .pages
            .iter()
            .filter(|p| p.language_id == language_id)
            .filter(|p| wanted.contains(p.slug.as_str()))
            .filter(|p| self.belongs_to_site(p.default_language_uid()))
            .cloned()
            .collect();

        // Exact match will be first, that's important
        pages.sort_by_key(|p| Reverse(p.slug.clone()));
        Ok(pages)
    }

    fn find_page_by_id(&self, page_id: u32, language_id: u32) -> RoutingResult<Option<PageRecord>> {
        if language_id > 0 {
            let translation = self
                .pages
                .iter()
                .find(|p| p.l10n_parent == Some(page_id) && p.language_id == language_id);
            if let Some(page) = translation {
                return Ok(Some(page.clone()));
            }
        }

        Ok(self
            .pages
            .iter()
            .find(|p| p.uid == page_id && p.l10n_parent.is_none())
            .cloned())
    }
}
