//! Shared error taxonomy, logging setup, and run configuration for the
//! event management service workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::RunConfig;
pub use error::CommandError;
pub use error::EmsError;
