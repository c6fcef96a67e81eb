//! # Storage Layer
//!
//! Persistence layer for manufacturing nodes.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Nodes | Pretty-printed JSON array | `data/nodes.json` |
//! | Local config | TOML | `./manu.toml` |
//! | Global config | TOML | `~/.config/manu-node/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`NodeStore`] serializes access with an in-process reader/writer lock
//! - Mutations hold the write lock across the whole read-modify-write
//! - Writes are atomic (temp file + rename)
//! - Separate processes sharing one file are not coordinated
//!
//! ## Key Types
//!
//! - [`NodeStore`] - Read/write nodes as JSON
//! - [`StoreError`] - Failures surfaced by the store
//! - [`Config`] - Local and global configuration

mod config;
mod json;

pub use config::{
    Config, ConfigError, GlobalConfig, LocalConfig, OutputFormat, DEFAULT_DATA_DIR,
    LOCAL_CONFIG_FILE,
};
pub use json::{NodeStore, StoreError, DEFAULT_FILE_NAME};
