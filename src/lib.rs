//! Shell-completion specs for `cargo-watch`: a validated, immutable tree of
//! subcommands, options and arguments, plus the lookups a completion host
//! needs to drive suggestions from it.

pub mod cmd;
pub mod config;
pub mod interface;
pub mod registry;
pub mod spec;
