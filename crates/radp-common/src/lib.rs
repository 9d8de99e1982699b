//! RADP Common Library
//!
//! Shared utilities and error handling for the RADP workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all RADP workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Checksums**: File content hashing for dedup identity and verification
//! - **Logging**: Centralized tracing configuration and initialization

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{RadpError, Result};
