//! TLS Session Proxy Library
//!
//! A forwarding proxy that keeps per-client browser state (cookies, TLS
//! identity) alive across requests from different callers.
//!
//! # Architecture Overview
//!
//! ```text
//!  Caller Request                ┌──────────────────────────────────────────┐
//!  ───────────────────────────▶ │  http    (routes, auth, serde models)    │
//!                               └──────────────────┬───────────────────────┘
//!                                                  ▼
//!                               ┌──────────────────────────────────────────┐
//!                               │  proxy   (executor → redirects → headers)│
//!                               └───────┬──────────────────────┬───────────┘
//!                                       ▼                      ▼
//!                               ┌───────────────┐     ┌──────────────────┐
//!                               │  session      │     │  transport       │
//!                               │  (TTL store,  │────▶│  (client handles,│
//!                               │   reaper)     │     │   cookie jars)   │
//!                               └───────────────┘     └────────┬─────────┘
//!                                                              ▼
//!                                                       Target Server
//! ```

// Core subsystems
pub mod error;
pub mod proxy;
pub mod session;
pub mod transport;

// API surface
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use proxy::RequestExecutor;
pub use session::SessionStore;
