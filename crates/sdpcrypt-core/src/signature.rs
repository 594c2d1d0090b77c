// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Per-command slot signatures.
//!
//! The host builds operations in one of the client shapes below; the client
//! translates them to the TA-side shape, which the trusted application checks
//! before touching any slot.

use crate::command::Command;
use crate::error::CryptoError;
use crate::operation::{Operation, param_types, ta_param_types};
use crate::param::{ParamType, TaParamType};

/// CTR128 into host memory: `(temp-in, temp-out, whole, whole)`.
pub const AES_CTR128_ENCRYPT_PARAM_TYPES: u32 = param_types(
    ParamType::MemrefTempInput,
    ParamType::MemrefTempOutput,
    ParamType::MemrefWhole,
    ParamType::MemrefWhole,
);

/// CTR128 into secure memory: `(temp-in, partial-out, whole, whole)`.
pub const AES_CTR128_ENCRYPT_SECURE_PARAM_TYPES: u32 = param_types(
    ParamType::MemrefTempInput,
    ParamType::MemrefPartialOutput,
    ParamType::MemrefWhole,
    ParamType::MemrefWhole,
);

/// Pattern CTR128 into secure memory: `(temp-in, partial-out, temp-in, temp-in)`.
pub const AES_CTR128_PATTERN_PARAM_TYPES: u32 = param_types(
    ParamType::MemrefTempInput,
    ParamType::MemrefPartialOutput,
    ParamType::MemrefTempInput,
    ParamType::MemrefTempInput,
);

/// Clear copy into secure memory: `(partial-in, partial-out, none, none)`.
pub const COPY_SECURE_MEMORY_PARAM_TYPES: u32 = param_types(
    ParamType::MemrefPartialInput,
    ParamType::MemrefPartialOutput,
    ParamType::None,
    ParamType::None,
);

/// Commands without parameters.
pub const NO_PARAM_TYPES: u32 = 0;

/// TA-side shape of both CTR128 client shapes.
pub const AES_CTR128_ENCRYPT_TEE_PARAM_TYPES: u32 = ta_param_types(
    TaParamType::MemrefInput,
    TaParamType::MemrefOutput,
    TaParamType::MemrefInput,
    TaParamType::MemrefInput,
);

/// TA-side shape of the pattern command.
pub const AES_CTR128_PATTERN_TEE_PARAM_TYPES: u32 = ta_param_types(
    TaParamType::MemrefInput,
    TaParamType::MemrefOutput,
    TaParamType::MemrefInput,
    TaParamType::MemrefInput,
);

/// TA-side shape of the copy command.
pub const COPY_SECURE_MEMORY_TEE_PARAM_TYPES: u32 = ta_param_types(
    TaParamType::MemrefInput,
    TaParamType::MemrefOutput,
    TaParamType::None,
    TaParamType::None,
);

impl Command {
    /// Client type words the host may build for this command.
    pub const fn client_signatures(self) -> &'static [u32] {
        match self {
            Command::AesCtr128Encrypt => &[
                AES_CTR128_ENCRYPT_PARAM_TYPES,
                AES_CTR128_ENCRYPT_SECURE_PARAM_TYPES,
            ],
            Command::CopySecureMemory => &[COPY_SECURE_MEMORY_PARAM_TYPES],
            Command::AesCtr128SecureEncrypt => &[AES_CTR128_PATTERN_PARAM_TYPES],
            Command::InitializeHandlers | Command::FinalizeHandlers => &[NO_PARAM_TYPES],
        }
    }

    /// Type word the trusted application expects for this command.
    pub const fn ta_signature(self) -> u32 {
        match self {
            Command::AesCtr128Encrypt => AES_CTR128_ENCRYPT_TEE_PARAM_TYPES,
            Command::CopySecureMemory => COPY_SECURE_MEMORY_TEE_PARAM_TYPES,
            Command::AesCtr128SecureEncrypt => AES_CTR128_PATTERN_TEE_PARAM_TYPES,
            Command::InitializeHandlers | Command::FinalizeHandlers => NO_PARAM_TYPES,
        }
    }
}

/// Checks that `op` has one of the client shapes accepted by `command`.
pub fn check_signature(command: Command, op: &Operation<'_>) -> Result<(), CryptoError> {
    let actual = op.param_types();
    let accepted = command.client_signatures();

    if accepted.contains(&actual) {
        return Ok(());
    }

    Err(CryptoError::SignatureMismatch {
        command,
        expected: accepted.first().copied().unwrap_or(NO_PARAM_TYPES),
        actual,
    })
}
