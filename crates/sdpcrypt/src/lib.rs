// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Secure data path decryption through the AES decryptor trusted application.
//!
//! This crate holds the process's single session and exposes the five entry
//! points media pipelines call:
//!
//! | Entry point | Purpose |
//! |---|---|
//! | [`crypto_init`] | Open the session (idempotent) |
//! | [`crypto_close`] | Close the session (idempotent) |
//! | [`aes_ctr128_encrypt`] | Stream AES-128-CTR into host or secure memory |
//! | [`aes_ctr128_encrypt_secure`] | Decipher a CENC sub-sample pattern into secure memory |
//! | [`copy_secure_memory`] | Copy clear bytes into secure memory |
//!
//! ## Example
//!
//! ```rust,ignore
//! use sdpcrypt::{Config, CtrOutput, StreamCursor};
//!
//! sdpcrypt::crypto_init(transport, |addr| ion_fd_for(addr), Config::default())?;
//!
//! let mut cursor = StreamCursor::new(iv);
//! sdpcrypt::aes_ctr128_encrypt(
//!     &mut sample,
//!     CtrOutput::Host(&mut clear),
//!     sample.len(),
//!     &key,
//!     &mut cursor,
//!     0,
//! )?;
//!
//! sdpcrypt::crypto_close()?;
//! ```
//!
//! ## Failures
//!
//! Shape errors (bad arguments, unresolvable secure addresses) are always
//! returned. Failures past the point of remote invocation, and every failure
//! while opening the session, go through the configured [`FatalPolicy`]: the
//! default exits the process with status 1.

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod config;
mod engine;
mod fatal;

pub use config::{CarryMode, Config, FatalPolicy};
pub use engine::{
    aes_ctr128_encrypt, aes_ctr128_encrypt_secure, copy_secure_memory, crypto_close, crypto_init,
    is_initialized,
};

pub use sdpcrypt_cipher::{CtrOutput, SecureMemoryResolver, StreamCursor, ctr128_inc};
pub use sdpcrypt_core::{
    Command, CryptoError, ErrorOrigin, LoginMethod, SUB_SAMPLE_SENTINEL, SecureAddr, SecureHandle,
    SubSample, SubSampleList, TA_AES_DECRYPTOR_UUID, TeeCall, TeeError, TeeStatus, Transport, Uuid,
};
pub use sdpcrypt_session::SessionConfig;
