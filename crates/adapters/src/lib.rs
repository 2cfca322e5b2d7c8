// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mg-adapters: seams to everything outside the render pipeline.
//!
//! Subprocess supervision for the external tools, plus the two
//! out-of-process collaborators: the messaging transport (delivery) and
//! the request/response persistence (catalog). Each trait ships a
//! recording Fake for other crates' tests.

pub mod catalog;
pub mod delivery;
pub mod subprocess;

pub use catalog::{CatalogAdapter, CatalogError};
pub use delivery::{DeliveryAdapter, DeliveryError};
pub use subprocess::{run_with_timeout, SubprocessError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use catalog::FakeCatalogAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use delivery::{DeliveryCall, FakeDeliveryAdapter};
