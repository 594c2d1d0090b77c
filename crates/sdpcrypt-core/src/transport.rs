// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use uuid::Uuid;

use crate::command::Command;
use crate::error::TeeError;
use crate::handle::SecureHandle;
use crate::operation::Operation;
use crate::region::{MemFlags, ShmId};

/// Login method used when opening a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum LoginMethod {
    /// No client identity is supplied.
    #[default]
    Public = 0x0,
    /// Identity of the calling user.
    User = 0x1,
    /// Identity of the calling group.
    Group = 0x2,
    /// Identity of the calling application.
    Application = 0x4,
}

/// Client side of the command-passing transport into the TEE.
///
/// One implementation owns at most one context and one session. Calls block
/// until the remote side returns; no method is re-entrant.
pub trait Transport {
    /// Creates the context connecting this client to the TEE.
    fn initialize_context(&mut self) -> Result<(), TeeError>;

    /// Finalizes the context. Sessions and regions must be gone first.
    fn finalize_context(&mut self);

    /// Opens the session to the trusted application `uuid`.
    fn open_session(&mut self, uuid: &Uuid, login: LoginMethod) -> Result<(), TeeError>;

    /// Closes the session.
    fn close_session(&mut self);

    /// Allocates `size` bytes of transport-owned shared memory.
    fn allocate_shared_memory(&mut self, size: usize, flags: MemFlags) -> Result<ShmId, TeeError>;

    /// Registers caller memory. The caller keeps `buffer` alive and unchanged
    /// until the region is released.
    fn register_shared_memory(&mut self, buffer: &[u8], flags: MemFlags)
    -> Result<ShmId, TeeError>;

    /// Registers a protected region by handle. Returns the region size.
    fn register_shared_memory_fd(
        &mut self,
        handle: SecureHandle,
        flags: MemFlags,
    ) -> Result<(ShmId, usize), TeeError>;

    /// Host view of an allocated region. `None` for registered regions.
    fn shared_memory_mut(&mut self, id: ShmId) -> Option<&mut [u8]>;

    /// Releases an allocation or registration.
    fn release_shared_memory(&mut self, id: ShmId);

    /// Invokes `command` and blocks until the trusted application returns.
    fn invoke_command(&mut self, command: Command, op: &mut Operation<'_>) -> Result<(), TeeError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn initialize_context(&mut self) -> Result<(), TeeError> {
        (**self).initialize_context()
    }

    fn finalize_context(&mut self) {
        (**self).finalize_context()
    }

    fn open_session(&mut self, uuid: &Uuid, login: LoginMethod) -> Result<(), TeeError> {
        (**self).open_session(uuid, login)
    }

    fn close_session(&mut self) {
        (**self).close_session()
    }

    fn allocate_shared_memory(&mut self, size: usize, flags: MemFlags) -> Result<ShmId, TeeError> {
        (**self).allocate_shared_memory(size, flags)
    }

    fn register_shared_memory(
        &mut self,
        buffer: &[u8],
        flags: MemFlags,
    ) -> Result<ShmId, TeeError> {
        (**self).register_shared_memory(buffer, flags)
    }

    fn register_shared_memory_fd(
        &mut self,
        handle: SecureHandle,
        flags: MemFlags,
    ) -> Result<(ShmId, usize), TeeError> {
        (**self).register_shared_memory_fd(handle, flags)
    }

    fn shared_memory_mut(&mut self, id: ShmId) -> Option<&mut [u8]> {
        (**self).shared_memory_mut(id)
    }

    fn release_shared_memory(&mut self, id: ShmId) {
        (**self).release_shared_memory(id)
    }

    fn invoke_command(&mut self, command: Command, op: &mut Operation<'_>) -> Result<(), TeeError> {
        (**self).invoke_command(command, op)
    }
}
