//! Git operations module
//!
//! Thin async wrappers over the `git` executable:
//! - Cloning a plugin repository
//! - Reading and switching the checked-out branch
//! - Working copy queries (top level, cleanliness, remotes)

mod branch;
mod clone;
mod command;
mod repo;

// Re-export public API
pub use branch::{checkout_branch, current_branch};
pub use clone::clone_repository;
pub use repo::{is_clean, is_repository, remote_url};
