// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use sdpcrypt_core::{LoginMethod, TA_AES_DECRYPTOR_UUID, Uuid};

/// How a [`Session`](crate::Session) reaches the trusted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Trusted application to open.
    pub uuid: Uuid,
    /// Login method for the session.
    pub login: LoginMethod,
    /// Send INITIALIZE_HANDLERS after opening and FINALIZE_HANDLERS before closing.
    pub handler_lifecycle: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            uuid: TA_AES_DECRYPTOR_UUID,
            login: LoginMethod::Public,
            handler_lifecycle: true,
        }
    }
}
