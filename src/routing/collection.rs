//! Ordered route candidate sets.

use crate::routing::route::Route;

/// Named routes in insertion order.
///
/// The plain slug route of a page is added first; enhancers append more
/// specific variants after it.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<(String, Route)>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. An existing route with the same name is replaced and
    /// the new one moves to the end.
    pub fn add(&mut self, name: impl Into<String>, route: Route) {
        let name = name.into();
        self.routes.retain(|(existing, _)| *existing != name);
        self.routes.push((name, route));
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Route)> {
        self.routes.iter_mut().map(|(n, r)| (n.as_str(), r))
    }

    /// Routes added at or after `index`.
    pub fn iter_from_mut(&mut self, index: usize) -> impl Iterator<Item = &mut Route> {
        self.routes.iter_mut().skip(index).map(|(_, r)| r)
    }

    /// Prefix all route names, e.g. with the owning page id.
    pub fn add_name_prefix(&mut self, prefix: &str) {
        for (name, _) in &mut self.routes {
            name.insert_str(0, prefix);
        }
    }

    /// Append all routes of `other`.
    pub fn add_collection(&mut self, other: RouteCollection) {
        for (name, route) in other.routes {
            self.add(name, route);
        }
    }
}
