// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::CryptoError;

/// Opaque handle (file descriptor) naming a protected memory region.
///
/// Always non-negative. The host may reference sub-windows of the region by
/// `(handle, offset, length)` but never reads or writes the memory itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecureHandle(i32);

impl SecureHandle {
    /// Wraps a raw descriptor. Returns `None` for negative values.
    #[inline]
    pub const fn new(fd: i32) -> Option<Self> {
        if fd < 0 { None } else { Some(Self(fd)) }
    }

    /// Returns the raw descriptor.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for SecureHandle {
    type Error = CryptoError;

    fn try_from(fd: i32) -> Result<Self, Self::Error> {
        Self::new(fd).ok_or(CryptoError::UnresolvedHandle(fd))
    }
}

/// Host-visible address of a buffer backed by protected memory.
///
/// Only ever compared and handed to a resolver; never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecureAddr(usize);

impl SecureAddr {
    /// Wraps a raw address.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Wraps the address of a pointer handed out by the secure allocator.
    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Returns the raw address.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}
