// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Shared region descriptors.

use core::fmt;
use core::ops::BitOr;

use crate::handle::SecureHandle;

/// Transport-assigned identifier of a shared region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShmId(u32);

impl ShmId {
    /// Wraps a raw identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Direction flags of a shared region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemFlags(u32);

impl MemFlags {
    /// Host to TEE.
    pub const INPUT: Self = Self(0x1);
    /// TEE to host.
    pub const OUTPUT: Self = Self(0x2);
    /// Both directions.
    pub const INOUT: Self = Self(0x3);

    /// Returns the raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Memory behind a shared region.
pub enum Backing<'buf> {
    /// Owned by the transport; reachable through `Transport::shared_memory_mut`.
    Allocated,
    /// Caller memory registered for the lifetime of the region.
    Host(&'buf [u8]),
    /// Protected memory the host may not dereference.
    Handle(SecureHandle),
}

impl Backing<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Backing::Allocated => "allocated",
            Backing::Host(_) => "host",
            Backing::Handle(_) => "handle",
        }
    }
}

/// A buffer known to both protection domains.
///
/// Deliberately neither `Clone` nor `Copy`: each region is released exactly once,
/// by value.
pub struct SharedRegion<'buf> {
    id: ShmId,
    size: usize,
    flags: MemFlags,
    backing: Backing<'buf>,
}

impl<'buf> SharedRegion<'buf> {
    /// Creates a region descriptor. Used by arena implementations after the
    /// transport accepted the allocation or registration.
    pub fn new(id: ShmId, size: usize, flags: MemFlags, backing: Backing<'buf>) -> Self {
        Self {
            id,
            size,
            flags,
            backing,
        }
    }

    /// Transport identifier.
    #[inline]
    pub fn id(&self) -> ShmId {
        self.id
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Direction flags.
    #[inline]
    pub fn flags(&self) -> MemFlags {
        self.flags
    }

    /// Backing memory.
    #[inline]
    pub fn backing(&self) -> &Backing<'buf> {
        &self.backing
    }

    /// Registered host bytes, if this region wraps caller memory.
    pub fn host_bytes(&self) -> Option<&'buf [u8]> {
        match self.backing {
            Backing::Host(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Secure handle, if this region wraps protected memory.
    pub fn handle(&self) -> Option<SecureHandle> {
        match self.backing {
            Backing::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    /// Returns true if the transport owns the backing memory.
    pub fn is_allocated(&self) -> bool {
        matches!(self.backing, Backing::Allocated)
    }

    /// Returns true if `[offset, offset + len)` lies within the region.
    pub fn contains_window(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.size)
    }
}

impl fmt::Debug for SharedRegion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegion")
            .field("id", &self.id.get())
            .field("size", &self.size)
            .field("flags", &self.flags.bits())
            .field("backing", &self.backing.kind())
            .finish_non_exhaustive()
    }
}
