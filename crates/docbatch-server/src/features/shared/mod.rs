//! Shared utilities for feature modules
//!
//! - **test_helpers**: Store fixtures and in-memory archives (test-only)

#[cfg(test)]
pub mod test_helpers;
