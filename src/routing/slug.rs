//! Slug candidate generation.
//!
//! # Responsibilities
//! - Derive every page slug that could own a request path
//! - Order candidates from most to least specific
//!
//! # Design Decisions
//! - A dotted last segment is split so format suffixes (`.json`) can be
//!   handled by enhancers on the parent slug
//! - Candidates with a trailing slash come before the bare variant
//! - The root slug `/` always closes the list

/// Returns the possible slugs for a path like `/home/about-us/offices.json`.
///
/// ```text
/// /home/about-us/offices/json/
/// /home/about-us/offices/json
/// /home/about-us/offices/
/// /home/about-us/offices
/// /home/about-us/
/// /home/about-us
/// /home/
/// /home
/// /
/// ```
pub fn candidate_slugs(route_path: &str) -> Vec<String> {
    let mut parts: Vec<&str> = route_path.split('/').filter(|p| !p.is_empty()).collect();

    if let Some(last) = parts.pop() {
        if last.contains('.') {
            parts.extend(last.split('.').filter(|p| !p.is_empty()));
        } else {
            parts.push(last);
        }
    }

    let mut candidates = Vec::with_capacity(parts.len() * 2 + 1);
    while !parts.is_empty() {
        let prefix = format!("/{}", parts.join("/"));
        candidates.push(format!("{}/", prefix));
        candidates.push(prefix);
        parts.pop();
    }
    candidates.push("/".to_string());
    candidates
}
