//! Bidirectional page routing for a content tree.
//!
//! # Architecture Overview
//!
//! ```text
//!     request path ──▶ slug candidates ──▶ PageFinder ──▶ route collection
//!                                                              │
//!                        enhancers (decorate, route) ──────────┤
//!                        aspects (value mapping) ──────────────┤
//!                                                              ▼
//!                                          matcher ──▶ RouteArguments
//!
//!     page + parameters ──▶ route collection ──▶ generator ──▶ cHash ──▶ URI
//! ```
//!
//! Both directions build their route collections per call from immutable
//! site configuration, so a `PageRouter` can be shared across threads.

pub mod aspect;
pub mod config;
pub mod enhancer;
pub mod observability;
pub mod routing;
pub mod site;

pub use config::schema::RouterConfig;
pub use routing::{
    GenerateOptions, PageReference, PageRouter, Parameters, ReferenceType, RouteArguments, RoutingError,
    RoutingResult,
};
pub use site::{PageRecord, Site, SiteLanguage};
