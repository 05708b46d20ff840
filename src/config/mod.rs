//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ApiConfig (validated, immutable)
//!     → route table + gateway registry built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, ConfigResult};
pub use schema::{
    ApiConfig, CannedReply, ListenerConfig, LogFormat, ObservabilityConfig, ResolverConfig,
    RouteConfig, SecurityConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
