//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, one event per decision)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metric updates are cheap (atomic increments), safe on the hot path
//! - Session gauge is updated at every map mutation, not sampled

pub mod metrics;
