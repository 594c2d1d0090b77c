// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use sdpcrypt_core::SecureAddr;

/// Maps a host-visible secure pointer to the handle of its protected region.
///
/// A negative return means the address is unknown; it is passed through to the
/// caller unchanged.
pub trait SecureMemoryResolver {
    /// Returns the handle (file descriptor) backing `addr`, or a negative value.
    fn resolve(&self, addr: SecureAddr) -> i32;
}

impl<F> SecureMemoryResolver for F
where
    F: Fn(SecureAddr) -> i32,
{
    fn resolve(&self, addr: SecureAddr) -> i32 {
        self(addr)
    }
}
