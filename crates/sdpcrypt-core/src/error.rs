// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for sdpcrypt.

use core::fmt;

use thiserror::Error;

use crate::command::Command;

/// GlobalPlatform result code returned by the transport or the TA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeeStatus(pub u32);

impl TeeStatus {
    /// Success.
    pub const SUCCESS: Self = Self(0x0000_0000);
    /// Non-specific failure.
    pub const GENERIC: Self = Self(0xFFFF_0000);
    /// Access rights check failed.
    pub const ACCESS_DENIED: Self = Self(0xFFFF_0001);
    /// Input data was of invalid format.
    pub const BAD_FORMAT: Self = Self(0xFFFF_0005);
    /// Input parameters were invalid.
    pub const BAD_PARAMETERS: Self = Self(0xFFFF_0006);
    /// Operation is not valid in the current state.
    pub const BAD_STATE: Self = Self(0xFFFF_0007);
    /// Requested data item was not found.
    pub const ITEM_NOT_FOUND: Self = Self(0xFFFF_0008);
    /// Requested operation is not supported.
    pub const NOT_SUPPORTED: Self = Self(0xFFFF_000A);
    /// System ran out of resources.
    pub const OUT_OF_MEMORY: Self = Self(0xFFFF_000C);
    /// Communication with the remote party failed.
    pub const COMMUNICATION: Self = Self(0xFFFF_000E);
    /// A security fault was detected.
    pub const SECURITY: Self = Self(0xFFFF_000F);
    /// Supplied buffer is too short for the output.
    pub const SHORT_BUFFER: Self = Self(0xFFFF_0010);

    /// Returns the raw code.
    #[inline]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Returns true for [`TeeStatus::SUCCESS`].
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl fmt::Display for TeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Layer that produced a [`TeeStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorOrigin {
    /// The client API implementation.
    Api = 1,
    /// The communication stack between host and TEE.
    Comms = 2,
    /// The TEE core.
    Tee = 3,
    /// The trusted application.
    TrustedApp = 4,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", *self as u32)
    }
}

/// Transport entry point that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeeCall {
    /// Context creation.
    InitializeContext,
    /// Session open against the TA UUID.
    OpenSession,
    /// Arena-owned shared memory allocation.
    AllocateSharedMemory,
    /// Registration of host memory.
    RegisterSharedMemory,
    /// Registration of a secure memory handle.
    RegisterSharedMemoryFd,
    /// Command invocation.
    InvokeCommand(Command),
}

impl fmt::Display for TeeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeeCall::InitializeContext => f.write_str("InitializeContext"),
            TeeCall::OpenSession => f.write_str("OpenSession"),
            TeeCall::AllocateSharedMemory => f.write_str("AllocateSharedMemory"),
            TeeCall::RegisterSharedMemory => f.write_str("RegisterSharedMemory"),
            TeeCall::RegisterSharedMemoryFd => f.write_str("RegisterSharedMemoryFileDescriptor"),
            TeeCall::InvokeCommand(command) => write!(f, "InvokeCommand({command})"),
        }
    }
}

/// Non-success status reported by the transport.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{call} failed with code {status} origin {origin}")]
pub struct TeeError {
    /// Entry point that failed.
    pub call: TeeCall,
    /// Result code.
    pub status: TeeStatus,
    /// Layer that produced the code.
    pub origin: ErrorOrigin,
}

impl TeeError {
    /// Creates a new transport error.
    pub const fn new(call: TeeCall, status: TeeStatus, origin: ErrorOrigin) -> Self {
        Self {
            call,
            status,
            origin,
        }
    }
}

/// Errors returned by the sdpcrypt crates.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A required argument was missing, empty or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The secure memory resolver returned a negative handle.
    #[error("secure memory handle could not be resolved (got {0})")]
    UnresolvedHandle(i32),

    /// Registering the secure output buffer failed on the pattern path.
    #[error("secure buffer registration failed: {0}")]
    RegistrationFailed(TeeError),

    /// The host built an operation whose slot types do not match the command.
    #[error("parameter types {actual:#06x} do not match {command} (expected {expected:#06x})")]
    SignatureMismatch {
        /// Command being marshalled.
        command: Command,
        /// First accepted type word for the command.
        expected: u32,
        /// Type word actually built.
        actual: u32,
    },

    /// The transport or the TA reported a failure.
    #[error("remote invocation failed: {0}")]
    Remote(#[from] TeeError),

    /// No session is open.
    #[error("session not initialized")]
    NotInitialized,

    /// Another session is already live in this process.
    #[error("a session is already live in this process")]
    SessionAlreadyLive,

    /// The process-wide session lock was poisoned.
    #[error("session lock poisoned")]
    LockPoisoned,
}

impl CryptoError {
    /// Returns true when the caller cannot repair the condition in-situ.
    ///
    /// Covers every failure past the point of remote invocation and protocol
    /// mismatches.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CryptoError::Remote(_) | CryptoError::SignatureMismatch { .. }
        )
    }

    /// Maps the error to the negative integer convention of the C entry points.
    pub fn errno(&self) -> i32 {
        match self {
            CryptoError::InvalidArgument(_) => -libc::EINVAL,
            CryptoError::UnresolvedHandle(fd) if *fd < 0 => *fd,
            CryptoError::UnresolvedHandle(_) => -libc::EBADF,
            CryptoError::RegistrationFailed(_) => -1,
            CryptoError::NotInitialized => -libc::ENODEV,
            CryptoError::SessionAlreadyLive => -libc::EBUSY,
            CryptoError::SignatureMismatch { .. }
            | CryptoError::Remote(_)
            | CryptoError::LockPoisoned => -libc::EIO,
        }
    }
}
