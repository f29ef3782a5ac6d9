//! Routing metrics.
//!
//! # Metrics
//! - `page_router_match_total` (counter): request matches by outcome
//!   (`hit`, `miss`, `error`)
//! - `page_router_generate_total` (counter): URL generations by outcome
//!   (`hit`, `error`)
//! - `page_router_cache_hash_total` (counter): generated URLs carrying a `cHash`
//! - `page_router_route_candidates` (histogram): routes built per operation
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Outcome labels are static strings to keep cardinality fixed

pub fn record_match(outcome: &'static str) {
    ::metrics::counter!("page_router_match_total", "outcome" => outcome).increment(1);
}

pub fn record_generate(outcome: &'static str) {
    ::metrics::counter!("page_router_generate_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_hash() {
    ::metrics::counter!("page_router_cache_hash_total").increment(1);
}

pub fn record_route_candidates(count: usize) {
    ::metrics::histogram!("page_router_route_candidates").record(count as f64);
}
