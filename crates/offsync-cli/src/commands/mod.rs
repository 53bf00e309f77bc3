//! Command implementations for offsync-cli

pub mod mark;
pub mod status;
pub mod target;
pub mod transfer;

pub use mark::{run_exclude, run_include, run_reset};
pub use status::run_status;
pub use target::{run_add, run_remove, run_set_source};
pub use transfer::{run_push, run_revert, run_summon};
