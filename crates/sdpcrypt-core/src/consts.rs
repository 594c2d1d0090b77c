// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Constants shared with the trusted application. Must not change on one side only.

use uuid::Uuid;

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;
/// AES-CTR initialization vector (counter block) size in bytes.
pub const AES_IV_SIZE: usize = AES_BLOCK_SIZE;
/// AES-128 key size in bytes.
pub const AES_KEY_SIZE: usize = AES_BLOCK_SIZE;
/// Size of the concatenated `key || iv` handed to the pattern command.
pub const AES_KEY_IV_SIZE: usize = AES_KEY_SIZE + AES_IV_SIZE;

/// UUID of the AES decryptor trusted application.
pub const TA_AES_DECRYPTOR_UUID: Uuid = Uuid::from_u128(0x442e_d209_b89f_4e6e_9a6b_bd3c_a9e1_d7c4);

/// Number of parameter slots in every operation.
pub const NUM_PARAMS: usize = 4;

/// CTR128 slot: encrypted input.
pub const PARAM_AES_ENCRYPTED_BUFFER_IDX: usize = 0;
/// CTR128 slot: decrypted output.
pub const PARAM_AES_DECRYPTED_BUFFER_IDX: usize = 1;
/// CTR128 slot: IV region.
pub const PARAM_AES_IV_IDX: usize = 2;
/// CTR128 slot: key region.
pub const PARAM_AES_KEY_IDX: usize = 3;

/// Copy slot: clear source window.
pub const PARAM_COPY_SECURE_MEMORY_SOURCE_IDX: usize = 0;
/// Copy slot: secure destination window.
pub const PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX: usize = 1;

/// Pattern slot: host input.
pub const PARAM_PATTERN_INPUT_IDX: usize = 0;
/// Pattern slot: secure output.
pub const PARAM_PATTERN_OUTPUT_IDX: usize = 1;
/// Pattern slot: sub-sample descriptor.
pub const PARAM_PATTERN_SUBSAMPLES_IDX: usize = 2;
/// Pattern slot: `key || iv`.
pub const PARAM_PATTERN_KEY_IV_IDX: usize = 3;
