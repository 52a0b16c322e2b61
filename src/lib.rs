//! presso: Java source intelligence for editors and agents.
//!
//! Declaration lookup, identifier classification, scope-aware and
//! cross-file rename, and structural insertion for Java projects, with a
//! JSON-speaking command line front door.

// Core infrastructure - re-exported from presso-core
pub use presso_core::config;
pub use presso_core::edit;
pub use presso_core::error;
pub use presso_core::output;
pub use presso_core::patch;
pub use presso_core::text;
pub use presso_core::types;

// Language support
pub use presso_java as java;

// Front door
pub mod cli;

// Error helpers for the command layer
pub mod error_bridges;
