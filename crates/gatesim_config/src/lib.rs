//! Parsing and validation of `gatesim.toml` project files.
//!
//! A project file names the top chip, the folder holding its `.hdl` library,
//! and simulation limits. It is read into a strongly typed [`ProjectConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
