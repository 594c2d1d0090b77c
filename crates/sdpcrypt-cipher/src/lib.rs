// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Cipher operations driven through the AES decryptor trusted application.
//!
//! [`TeeCipher`] owns the process's [`Session`](sdpcrypt_session::Session) and a
//! [`SecureMemoryResolver`], and exposes three operations:
//!
//! - **Streaming CTR128** ([`TeeCipher::stream_ctr128`]): deciphers a window of a
//!   stream into host memory or a secure buffer, threading the counter block and
//!   the partial-block carry through a caller-owned [`StreamCursor`].
//! - **Pattern CTR128** ([`TeeCipher::stream_ctr128_pattern`]): hands a sub-sample
//!   descriptor to the TA, which copies clear runs and deciphers encrypted runs
//!   into a secure buffer.
//! - **Secure copy** ([`TeeCipher::copy_to_secure`]): moves clear bytes into a
//!   secure buffer.
//!
//! The cipher arithmetic runs inside the TEE. Host code only frames windows,
//! keeps the counter, and balances every shared-memory registration.
//!
//! # Partial-block carry
//!
//! When a call ends mid-block, the leading ciphertext bytes of that block are
//! kept in [`StreamCursor::ecount_buf`]. The next in-place call writes them back
//! into `input[offset - num..offset]` so the TA sees a block-aligned window; the
//! caller must treat those bytes as already consumed. The staged variant
//! ([`TeeCipher::stream_ctr128_staged`]) assembles the window in a private
//! buffer instead and never writes to the input.

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod cipher;
mod counter;
mod resolver;

pub use cipher::{CtrOutput, TeeCipher};
pub use counter::{StreamCursor, ctr128_inc};
pub use resolver::SecureMemoryResolver;
