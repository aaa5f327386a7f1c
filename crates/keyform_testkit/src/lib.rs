//! # Keyform Testkit
//!
//! Test utilities for Keyform.
//!
//! This crate provides:
//! - Sample entities, schemas and records
//! - Property-based test generators using proptest
//! - Encoding vectors shared by tests and benchmarks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keyform_testkit::prelude::*;
//!
//! #[test]
//! fn orders_compile() {
//!     let entity = compiled_order();
//!     assert!(entity.diagnostics().is_empty());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
