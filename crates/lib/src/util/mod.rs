//! Shared utilities.
//!
//! Common utilities used across the crate including hashing, subprocess
//! execution and test helpers.

pub mod hash;
pub mod process;

#[cfg(test)]
pub mod testutil;
