//! Common test infrastructure for envkeeper-platform tests
//!
//! - `archives`: in-memory zip and tar.gz builders and standard archive contents
//! - `mock_server`: wiremock setup helpers for archive downloads
//! - `probes`: version probes that do not execute anything

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod archives;
pub mod mock_server;
pub mod probes;

pub use archives::*;
pub use mock_server::*;
pub use probes::*;
