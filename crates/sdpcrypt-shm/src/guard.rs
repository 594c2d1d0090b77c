// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;
use core::ops::Deref;

use sdpcrypt_core::{SharedRegion, Transport};

use crate::arena::Arena;

/// A shared region released when dropped.
pub struct RegionGuard<'a, 'buf, T: Transport> {
    arena: &'a Arena<T>,
    region: SharedRegion<'buf>,
}

impl<'a, 'buf, T: Transport> RegionGuard<'a, 'buf, T> {
    pub(crate) fn new(arena: &'a Arena<T>, region: SharedRegion<'buf>) -> Self {
        Self { arena, region }
    }
}

impl<'buf, T: Transport> Deref for RegionGuard<'_, 'buf, T> {
    type Target = SharedRegion<'buf>;

    fn deref(&self) -> &Self::Target {
        &self.region
    }
}

impl<T: Transport> Drop for RegionGuard<'_, '_, T> {
    fn drop(&mut self) {
        self.arena.release_region(&self.region);
    }
}

impl<T: Transport> fmt::Debug for RegionGuard<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegionGuard").field(&self.region).finish()
    }
}
