// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

/// Command codes understood by the trusted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// AES-CTR128 over a host or secure output window.
    AesCtr128Encrypt = 0,
    /// Clear copy from host memory into a secure buffer.
    CopySecureMemory = 1,
    /// AES-CTR128 over a sub-sample pattern into a secure buffer.
    AesCtr128SecureEncrypt = 2,
    /// Sets up the TA-side operation handlers. Sent once after the session opens.
    InitializeHandlers = 3,
    /// Tears down the TA-side operation handlers. Sent once before the session closes.
    FinalizeHandlers = 4,
}

impl Command {
    /// All commands, in code order.
    pub const ALL: [Command; 5] = [
        Command::AesCtr128Encrypt,
        Command::CopySecureMemory,
        Command::AesCtr128SecureEncrypt,
        Command::InitializeHandlers,
        Command::FinalizeHandlers,
    ];

    /// Returns the integer code sent over the transport.
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Returns the protocol name of the command.
    pub const fn name(self) -> &'static str {
        match self {
            Command::AesCtr128Encrypt => "AES_CTR128_ENCRYPT",
            Command::CopySecureMemory => "COPY_SECURE_MEMORY",
            Command::AesCtr128SecureEncrypt => "AES_CTR128_SECURE_ENCRYPT",
            Command::InitializeHandlers => "INITIALIZE_HANDLERS",
            Command::FinalizeHandlers => "FINALIZE_HANDLERS",
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = u32;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Command::ALL
            .into_iter()
            .find(|command| command.id() == id)
            .ok_or(id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
