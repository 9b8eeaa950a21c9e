//! HTTP API surface.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (Axum router, middleware layers)
//!     → auth.rs (X-API-Key check on proxy/session routes)
//!     → types.rs (deserialize + validate caller input)
//!     → handlers.rs (delegate to executor / session store)
//!     → error.rs (domain error → status code + JSON body)
//! ```
//!
//! # Design Decisions
//! - The surface stays thin: validation and serialization only, all
//!   behavior lives in the session and proxy modules
//! - Health and root endpoints are unauthenticated

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod types;

pub use server::{AppState, HttpServer};
