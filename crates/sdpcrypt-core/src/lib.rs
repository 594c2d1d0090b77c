// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Protocol layer between the host and the secure AES-CTR trusted application.
//!
//! This crate holds everything both protection domains must agree on, and
//! nothing that performs work:
//!
//! - **Constants**: block/key/IV sizes, the TA UUID, slot indices.
//! - **Commands**: the integer codes addressed to the TA ([`Command`]).
//! - **Parameters**: the four-slot [`Operation`] and its packed type word,
//!   plus the TA-side translation of each slot type.
//! - **Signatures**: the per-command slot shapes both sides check.
//! - **Sub-samples**: the sentinel-terminated `(clear, encrypted)` descriptor.
//! - **Transport**: the [`Transport`] trait standing in for the TEE client API.
//!
//! # Example
//!
//! ```rust
//! use sdpcrypt_core::{Command, Operation, Param, check_signature};
//!
//! let input = [0u8; 32];
//! let mut output = [0u8; 32];
//!
//! let op = Operation::new(
//!     Param::tmp_input(&input),
//!     Param::tmp_output(&mut output),
//!     Param::None,
//!     Param::None,
//! );
//!
//! // Slots 2 and 3 must carry the IV and key regions.
//! assert!(check_signature(Command::AesCtr128Encrypt, &op).is_err());
//! ```

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod command;
mod consts;
mod error;
mod handle;
mod operation;
mod param;
mod region;
mod signature;
mod subsample;
mod transport;

pub use command::Command;
pub use consts::{
    AES_BLOCK_SIZE, AES_IV_SIZE, AES_KEY_IV_SIZE, AES_KEY_SIZE, NUM_PARAMS,
    PARAM_AES_DECRYPTED_BUFFER_IDX, PARAM_AES_ENCRYPTED_BUFFER_IDX, PARAM_AES_IV_IDX,
    PARAM_AES_KEY_IDX, PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
    PARAM_COPY_SECURE_MEMORY_SOURCE_IDX, PARAM_PATTERN_INPUT_IDX, PARAM_PATTERN_KEY_IV_IDX,
    PARAM_PATTERN_OUTPUT_IDX, PARAM_PATTERN_SUBSAMPLES_IDX, TA_AES_DECRYPTOR_UUID,
};
pub use error::{CryptoError, ErrorOrigin, TeeCall, TeeError, TeeStatus};
pub use handle::{SecureAddr, SecureHandle};
pub use operation::{Operation, param_type_at, param_types, ta_param_types};
pub use param::{Param, ParamType, TaParamType};
pub use region::{Backing, MemFlags, SharedRegion, ShmId};
pub use signature::{
    AES_CTR128_ENCRYPT_PARAM_TYPES, AES_CTR128_ENCRYPT_SECURE_PARAM_TYPES,
    AES_CTR128_ENCRYPT_TEE_PARAM_TYPES, AES_CTR128_PATTERN_PARAM_TYPES,
    AES_CTR128_PATTERN_TEE_PARAM_TYPES, COPY_SECURE_MEMORY_PARAM_TYPES,
    COPY_SECURE_MEMORY_TEE_PARAM_TYPES, NO_PARAM_TYPES, check_signature,
};
pub use subsample::{
    SUB_SAMPLE_RECORD_SIZE, SUB_SAMPLE_SENTINEL, SubSample, SubSampleList, SubSampleWalk, walk,
};
pub use transport::{LoginMethod, Transport};

pub use uuid::Uuid;
