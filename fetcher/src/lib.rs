//! muslbox fetcher library.
//!
//! This crate resolves, downloads, and extracts statically linked release
//! archives for the muslbox toolbox. It is used by the `muslbox-fetch` CLI
//! binary and can be consumed programmatically for testing or custom
//! acquisition workflows.
//!
//! # Modules
//!
//! - [`arch`] - Target architecture handling and host detection
//! - [`archive`] - Archive kinds, extraction, and content classification
//! - [`batch`] - Batch fetching for image builds
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Semantic error types
//! - [`matcher`] - Release asset matching
//! - [`release`] - Primary source: release-asset listings
//! - [`repo`] - Secondary source: the soar package repository
//! - [`resolver`] - The resolution pipeline
//! - [`source`] - Source identifiers and package specs

pub mod arch;
pub mod archive;
pub mod batch;
pub mod cli;
pub mod error;
pub mod matcher;
pub mod release;
pub mod repo;
pub mod resolver;
pub mod source;
