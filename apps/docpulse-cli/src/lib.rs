//! DocPulse command-line front end
//!
//! Wires the core tracker to a JSON file store and renders renewal logs.

pub mod cli;
pub mod commands;
pub mod reporter;
pub mod store;

pub use cli::Cli;
pub use store::JsonFileStore;
