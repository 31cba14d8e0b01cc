//! # envkeeper-plugins
//!
//! Plugin working copies of an envkeeper environment:
//! - Git plumbing (clone, branch, status, remotes)
//! - Per-plugin status against the descriptor entry
//! - Convergence: cloning missing plugins and switching clean ones to
//!   their required branch
//!
//! # Example
//!
//! ```no_run
//! use envkeeper_core::types::PluginEntry;
//! use envkeeper_plugins::lifecycle::plugin_status;
//! use camino::Utf8Path;
//!
//! # async fn example() {
//! let entry = PluginEntry::new("plugins/blog")
//!     .with_url("https://github.com/acme/blog.git")
//!     .with_branch("release-2.0");
//! let status = plugin_status(&entry, Utf8Path::new("/srv/env")).await;
//! println!("{}", status.message());
//! # }
//! ```

pub mod error;
pub mod git;
pub mod lifecycle;

pub use error::{Error, Result};
pub use lifecycle::{converge, is_clean, plugin_status, remove_working_copy, PluginAction};
