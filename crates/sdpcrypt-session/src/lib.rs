// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Session lifecycle against the AES decryptor trusted application.
//!
//! A [`Session`] owns the TEE context, one open session, and the two 16-byte
//! input regions (`iv` and `key`) every streaming call refills. Opening runs
//! the whole setup and closing (explicit or on drop) runs the whole teardown.
//! At most one session is live per process.

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod config;
mod session;

pub use config::SessionConfig;
pub use session::{Session, is_session_live};
