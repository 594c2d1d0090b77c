// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for sdpcrypt crates.
//!
//! [`SimulatedTee`] is an in-process [`Transport`](sdpcrypt_core::Transport) that
//! services every command the way the trusted application does, with the cipher
//! work done by the `aes` and `ctr` crates. [`TeeProbe`] is a cloneable view of
//! the same state, kept by tests after the transport has been moved into a
//! session.
//!
//! ## License
//!
//! GPL-3.0-only

mod simulated_tee;
mod trusted_app;

pub use simulated_tee::{Invocation, SimulatedTee, SlotRecord, TeeProbe, UNRESOLVED_HANDLE};
pub use trusted_app::aes_ctr128;
