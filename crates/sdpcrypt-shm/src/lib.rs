// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Shared-memory arena over a [`Transport`](sdpcrypt_core::Transport).
//!
//! Every allocation or registration made through an [`Arena`] is counted until it
//! is released. Scoped variants return a [`RegionGuard`] that releases on drop, so
//! early returns through `?` never leak a registration.
//!
//! ```rust
//! use sdpcrypt_core::{MemFlags, Transport};
//! use sdpcrypt_shm::Arena;
//! use sdpcrypt_test_utils::SimulatedTee;
//!
//! let arena = Arena::new(SimulatedTee::new());
//! arena
//!     .with_transport(|tee| tee.initialize_context())
//!     .expect("Failed to initialize_context()");
//!
//! {
//!     let region = arena
//!         .allocate_scoped(16, MemFlags::INPUT)
//!         .expect("Failed to allocate_scoped(..)");
//!     assert_eq!(region.size(), 16);
//!     assert_eq!(arena.live_regions(), 1);
//! }
//!
//! assert_eq!(arena.live_regions(), 0);
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod arena;
mod guard;

pub use arena::Arena;
pub use guard::RegionGuard;
