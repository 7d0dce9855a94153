//! terra-core — shared types, map program parsing, and configuration.
//!
//! Everything the other terramap crates agree on lives here: the
//! [`MapSpec`] family of types describing a map widget, the line-oriented
//! map program language that clients submit, and the service configuration
//! loaded once at process start.

pub mod config;
pub mod program;
pub mod types;

pub use config::{ConfigError, ServiceConfig};
pub use program::{parse_program, unescape_newlines, ProgramError};
pub use types::*;
