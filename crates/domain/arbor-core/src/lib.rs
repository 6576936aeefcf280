pub mod node;
pub mod path_utils;

pub use node::{Node, NodeKind};
