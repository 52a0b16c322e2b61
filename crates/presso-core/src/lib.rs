//! Core infrastructure for presso.
//!
//! This crate provides language-agnostic infrastructure:
//! - Byte spans and content hashes
//! - Batch span editing (descending-order application with overlap checks)
//! - Text position utilities (byte offset <-> line:col)
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Project configuration loading

pub mod config;
pub mod edit;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
pub mod types;
