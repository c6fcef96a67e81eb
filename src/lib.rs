//! Manufacturing node manager
//!
//! Keeps "manufacturing node" records (title, description, operations and a
//! UNS address) in a single JSON file and manages them from an interactive
//! shell or one-shot commands.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Node, NodeId};
pub use storage::{NodeStore, StoreError};
