//! Outbound HTTP client capability.
//!
//! # Data Flow
//! ```text
//! proxy executor / redirect follower
//!     → handle.rs (ClientHandle trait: issue request, read cookies, close)
//!     → tls.rs (reqwest-backed client with browser identity and cookie jar)
//!     → target server
//! ```
//!
//! # Design Decisions
//! - The capability is an object-safe trait; the core never sees reqwest
//! - Redirects are disabled at the client so the follower controls every hop
//! - Cookie enumeration is part of the required contract, not a probe
//! - One handle per session; handles are released exactly once

pub mod handle;
pub mod tls;

#[cfg(test)]
pub(crate) mod testing;

pub use handle::{ClientHandle, HandleFactory, OutboundRequest, OutboundResponse, Payload,
                 TransportError};
pub use tls::{TlsClient, TlsClientFactory};
