//! Shared infrastructure for the muslbox fetcher and verifier.
//!
//! This crate provides the plumbing both tools need but neither owns:
//!
//! - [`exec`] - Command execution abstraction with timeout support
//! - [`output`] - Progress and diagnostic output helpers
//! - [`env_delta`] - Environment snapshot diffing
//! - [`test_support`] - Command stubs for external test suites (feature
//!   `test-support`)

pub mod env_delta;
pub mod exec;
pub mod output;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use env_delta::compute_environment_delta;
pub use exec::{CommandExecutor, SystemCommandExecutor, TimedExecutor, run_with_timeout};
pub use output::{stderr_message, write_stderr_line};
