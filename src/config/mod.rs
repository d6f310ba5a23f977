//! Configuration module for Serial-Binder
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Running without a file is the normal case: `Config::default()` describes the
//! bundled serial and a file only overrides individual values.
//!
//! # Example
//!
//! ```no_run
//! use serial_binder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("binder.toml")).unwrap();
//! println!("Crawl starts at: {}", config.source.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArcConfig, BookConfig, Config, CrawlerConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
pub(crate) use validation::{compile_pattern, parse_selector};
