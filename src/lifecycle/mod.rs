//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Start session reaper → Bind listener
//!
//! Shutdown:
//!     Signal received → Stop accepting → Cancel reaper → Drain sessions
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
