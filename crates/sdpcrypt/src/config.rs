// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use sdpcrypt_session::SessionConfig;

/// What happens when a call fails past the point of remote invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FatalPolicy {
    /// Log and exit the process with status 1.
    #[default]
    Exit,
    /// Log and abort the process.
    Abort,
    /// Return the error to the caller.
    Propagate,
}

/// Where the streaming path assembles the partial-block carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarryMode {
    /// Write the carry into `input[offset - num..offset]`.
    #[default]
    InPlace,
    /// Assemble carry and input in a private buffer; `input` is never written.
    Staged,
}

/// Configuration for [`crypto_init`](crate::crypto_init).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Trusted application, login method and handler lifecycle.
    pub session: SessionConfig,
    /// Handling of fatal failures.
    pub fatal: FatalPolicy,
    /// Streaming carry contract.
    pub carry: CarryMode,
}
