//! Session lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! caller supplies an optional session id
//!     → store.rs (acquire: lookup / create / ephemeral)
//!     → record.rs (timestamps, request counter, owned client handle)
//!     → handle reused across that caller's requests
//!
//! Background:
//!     reaper task ticks on a fixed interval
//!     → store.rs sweep (evict records idle past the TTL, release handles)
//! ```
//!
//! # Design Decisions
//! - One async mutex guards the map; it is never held across outbound I/O
//! - Capacity check and insert happen under the same lock acquisition
//! - Ephemeral handles never enter the map at all
//! - The reaper is owned by the store and cancelled by `shutdown()`

pub mod record;
pub mod store;

pub use record::SessionRecord;
pub use store::{Acquired, SessionStore};
