//! muslbox verifier library.
//!
//! This crate checks an installed toolbox against its declared tool set:
//! presence, executability, identity, and static linkage, with a
//! documented-exception mechanism for accepted deviations. It is used by
//! the `muslbox-verify` CLI binary and can be consumed programmatically.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Semantic error types
//! - [`exceptions`] - The documented-exceptions manifest
//! - [`linkage`] - Static-linkage inspection
//! - [`locate`] - Ordered search-path binary location
//! - [`outcome`] - Outcomes and the aggregated report
//! - [`probe`] - Identity probing
//! - [`report`] - Report rendering
//! - [`toolset`] - The declared tool set
//! - [`verifier`] - The verification pipeline

pub mod cli;
pub mod error;
pub mod exceptions;
pub mod linkage;
pub mod locate;
pub mod outcome;
pub mod probe;
pub mod report;
pub mod toolset;
pub mod verifier;
