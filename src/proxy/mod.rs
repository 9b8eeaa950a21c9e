//! Request forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! validated caller input (ProxyCall)
//!     → executor.rs (resolve session, time, normalize, release ephemeral)
//!     → redirect.rs (hop loop: issue, inspect status, resolve Location)
//!     → headers.rs (per-hop browser header set)
//!     → transport handle
//! ```
//!
//! # Design Decisions
//! - Redirects are followed manually so per-hop headers stay correct
//! - Header composition is a pure function of hop URL + caller overrides
//! - The executor performs no retries; retry policy belongs to callers

pub mod executor;
pub mod headers;
pub mod redirect;

pub use executor::{HeaderEntry, ProxyCall, ProxyOutcome, RequestExecutor};
pub use headers::HeaderComposer;
pub use redirect::{Followed, RedirectFollower};
