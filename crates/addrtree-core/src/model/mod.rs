// ── Domain model ──

pub mod tree_node;
pub mod user;

pub use tree_node::{NodeRef, TreeNode, find_by_id};
pub use user::User;
