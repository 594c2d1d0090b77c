// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::cell::{Cell, RefCell};
use core::fmt;

use tracing::trace;
use zeroize::Zeroize;

use sdpcrypt_core::{
    Backing, Command, CryptoError, MemFlags, Operation, SecureHandle, SharedRegion, TeeError,
    Transport,
};

use crate::guard::RegionGuard;

/// Allocates, registers and releases regions shared with the TEE.
///
/// The arena does not reference-count: each region is released exactly once,
/// either by value through [`Arena::release`] or by dropping its guard.
pub struct Arena<T: Transport> {
    transport: RefCell<T>,
    live: Cell<usize>,
}

impl<T: Transport> Arena<T> {
    /// Wraps a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: RefCell::new(transport),
            live: Cell::new(0),
        }
    }

    /// Allocates `size` bytes of transport-owned memory.
    pub fn allocate(
        &self,
        size: usize,
        flags: MemFlags,
    ) -> Result<SharedRegion<'static>, TeeError> {
        let id = self
            .transport
            .borrow_mut()
            .allocate_shared_memory(size, flags)?;
        self.acquired();

        trace!(
            shm = id.get(),
            size,
            flags = flags.bits(),
            "allocated shared memory"
        );
        Ok(SharedRegion::new(id, size, flags, Backing::Allocated))
    }

    /// Registers caller memory for as long as the returned region lives.
    pub fn register_host<'buf>(
        &self,
        buffer: &'buf [u8],
        flags: MemFlags,
    ) -> Result<SharedRegion<'buf>, TeeError> {
        let id = self
            .transport
            .borrow_mut()
            .register_shared_memory(buffer, flags)?;
        self.acquired();

        trace!(
            shm = id.get(),
            size = buffer.len(),
            flags = flags.bits(),
            "registered host memory"
        );
        Ok(SharedRegion::new(
            id,
            buffer.len(),
            flags,
            Backing::Host(buffer),
        ))
    }

    /// Registers the protected region named by `handle`. Its size comes from the
    /// transport.
    pub fn register_handle(
        &self,
        handle: SecureHandle,
        flags: MemFlags,
    ) -> Result<SharedRegion<'static>, TeeError> {
        let (id, size) = self
            .transport
            .borrow_mut()
            .register_shared_memory_fd(handle, flags)?;
        self.acquired();

        trace!(
            shm = id.get(),
            fd = handle.raw(),
            size,
            flags = flags.bits(),
            "registered secure memory"
        );
        Ok(SharedRegion::new(id, size, flags, Backing::Handle(handle)))
    }

    /// Releases a region obtained from this arena.
    pub fn release(&self, region: SharedRegion<'_>) {
        self.release_region(&region);
    }

    /// Like [`allocate`](Self::allocate), released on drop.
    pub fn allocate_scoped(
        &self,
        size: usize,
        flags: MemFlags,
    ) -> Result<RegionGuard<'_, 'static, T>, TeeError> {
        self.allocate(size, flags)
            .map(|region| RegionGuard::new(self, region))
    }

    /// Like [`register_host`](Self::register_host), released on drop.
    pub fn register_host_scoped<'buf>(
        &self,
        buffer: &'buf [u8],
        flags: MemFlags,
    ) -> Result<RegionGuard<'_, 'buf, T>, TeeError> {
        self.register_host(buffer, flags)
            .map(|region| RegionGuard::new(self, region))
    }

    /// Like [`register_handle`](Self::register_handle), released on drop.
    pub fn register_handle_scoped(
        &self,
        handle: SecureHandle,
        flags: MemFlags,
    ) -> Result<RegionGuard<'_, 'static, T>, TeeError> {
        self.register_handle(handle, flags)
            .map(|region| RegionGuard::new(self, region))
    }

    /// Copies `bytes` to the start of an allocated region.
    pub fn fill(&self, region: &SharedRegion<'_>, bytes: &[u8]) -> Result<(), CryptoError> {
        let mut transport = self.transport.borrow_mut();
        let memory = transport
            .shared_memory_mut(region.id())
            .ok_or(CryptoError::InvalidArgument(
                "fill target is not an allocated region",
            ))?;
        let target = memory
            .get_mut(..bytes.len())
            .ok_or(CryptoError::InvalidArgument("fill exceeds the region size"))?;

        target.copy_from_slice(bytes);
        Ok(())
    }

    /// Zeroizes an allocated region. No-op for registered regions.
    pub fn wipe(&self, region: &SharedRegion<'_>) {
        if let Some(memory) = self.transport.borrow_mut().shared_memory_mut(region.id()) {
            memory.zeroize();
        }
    }

    /// Invokes `command` on the open session.
    pub fn invoke(&self, command: Command, op: &mut Operation<'_>) -> Result<(), TeeError> {
        trace!(
            command = command.name(),
            param_types = op.param_types(),
            "invoking command"
        );
        self.transport.borrow_mut().invoke_command(command, op)
    }

    /// Regions acquired through this arena and not yet released.
    pub fn live_regions(&self) -> usize {
        self.live.get()
    }

    /// Runs `f` with exclusive access to the transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut transport = self.transport.borrow_mut();
        f(&mut *transport)
    }

    /// Returns the transport.
    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }

    pub(crate) fn release_region(&self, region: &SharedRegion<'_>) {
        self.transport
            .borrow_mut()
            .release_shared_memory(region.id());
        self.live.set(self.live.get().saturating_sub(1));

        trace!(shm = region.id().get(), "released shared memory");
    }

    fn acquired(&self) {
        self.live.set(self.live.get() + 1);
    }
}

impl<T: Transport> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live.get())
            .finish_non_exhaustive()
    }
}
