//! # Timebus Test Suite
//!
//! Unified test crate containing the cross-component scenarios for the
//! timeout service: full request-to-reply flows through the assembled
//! service, failure and retry behavior, and concurrency stress.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scheduling.rs   # Happy-path request -> reply flows
//!     ├── delivery.rs     # Failure, rollback, and retry scenarios
//!     └── concurrency.rs  # Stress, overlap, and restart scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p timebus-tests
//!
//! # By category
//! cargo test -p timebus-tests integration::scheduling::
//! cargo test -p timebus-tests integration::delivery::
//! cargo test -p timebus-tests integration::concurrency::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]
