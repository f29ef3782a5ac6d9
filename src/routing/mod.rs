//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path (matching):
//!     → slug.rs (candidate slugs, most specific first)
//!     → router.rs (pages → route collection)
//!     → matcher.rs (first full match, else longest slug prefix)
//!     → arguments.rs (RouteArguments)
//!
//! Page + parameters (generation):
//!     → router.rs (generation route collection)
//!     → generator.rs (first route that substitutes)
//!     → cache_hash.rs (cHash for dynamic arguments)
//!     → URI string
//! ```
//!
//! # Design Decisions
//! - Route collections are built per operation and discarded afterwards
//! - Deterministic: parameters are sorted maps, routes keep insertion order
//! - Exact matches always win over slug prefix matches

pub mod arguments;
pub mod cache_hash;
pub mod collection;
pub mod generator;
pub mod matcher;
pub mod route;
pub mod router;
pub mod slug;
pub mod types;
pub mod variables;

pub use arguments::RouteArguments;
pub use cache_hash::{CacheHashCalculator, Sha256CacheHash};
pub use collection::RouteCollection;
pub use generator::{GenerateOptions, PageReference, ReferenceType};
pub use matcher::{MatchResult, PageUriMatcher};
pub use route::Route;
pub use router::PageRouter;
pub use slug::candidate_slugs;
pub use types::{Parameters, RoutingError, RoutingResult};
