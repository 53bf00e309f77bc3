//! Shared test utilities for the offsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`env`]: [`TestEnv`](env::TestEnv), a throwaway configuration directory
//!   together with a "remote" source tree and a local target root

pub mod env;

pub use env::TestEnv;
