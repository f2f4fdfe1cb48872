//! # Mailroom Testkit
//!
//! Testing utilities for Mailroom.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Generators**: Proptest strategies for receipts, transitions and filters
//! - **Fixtures**: A registry and in-memory store with seeded receivers
//! - **Recording index**: A [`mailroom::SearchIndex`] that keeps what it was given
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use mailroom_testkit::generators::{ReceiptState, transition};
//!
//! proptest! {
//!     #[test]
//!     fn transitions_are_idempotent(state: ReceiptState, t in transition()) {
//!         let mut once = state.receipt(1);
//!         t.update().apply_to(&mut once, 0);
//!         let mut twice = once.clone();
//!         t.update().apply_to(&mut twice, 0);
//!         prop_assert_eq!(once, twice);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,ignore
//! use mailroom_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let (conversation, message) = fixture.message("hi", "hello there").await;
//! let receipt = fixture.receipt(message.id, fixture.user(7)).await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod index;

pub use fixtures::{TestFixture, GROUP_KIND, USER_KIND};
pub use generators::ReceiptState;
pub use index::RecordingIndex;
