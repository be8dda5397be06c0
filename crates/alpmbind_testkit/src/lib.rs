//! # alpmbind testkit
//!
//! Test utilities for alpmbind.
//!
//! This crate provides:
//! - Temporary handles over seeded repositories
//! - Hooks that make the emulated library log and ask questions
//! - Property-based test generators using proptest
//!
//! It requires the `emulated` backend of `alpmbind_sys`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use alpmbind_testkit::prelude::*;
//!
//! #[test]
//! fn finds_the_kernel() {
//!     let th = TestHandle::core();
//!     let core = th.register("core");
//!     assert!(core.pkg("linux").is_ok());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
