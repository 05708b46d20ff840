//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Register routes → Freeze gateway responses → Bind
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Registration finishes before the listener binds
//! - Tests trigger shutdown through the same channel as signals

pub mod shutdown;

pub use shutdown::Shutdown;
