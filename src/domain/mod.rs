//! Domain models for the node manager
//!
//! Contains the node record and input rules without any I/O concerns.

mod id;
mod input;
mod node;

pub use id::NodeId;
pub use input::{check_field, check_title, is_valid_input, parse_operations, InputError};
pub use node::Node;
