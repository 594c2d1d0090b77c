// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Command handlers with the trusted application's checks.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

use sdpcrypt_core::{AES_KEY_IV_SIZE, AES_KEY_SIZE, TeeStatus, walk};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Reference AES-128-CTR with a full 128-bit big-endian counter.
pub fn aes_ctr128(key: &[u8; 16], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    Aes128Ctr::new(key.into(), iv.into()).apply_keystream(&mut out);
    out
}

fn decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, TeeStatus> {
    let mut cipher =
        Aes128Ctr::new_from_slices(key, iv).map_err(|_| TeeStatus::BAD_PARAMETERS)?;
    let mut out = data.to_vec();
    cipher.apply_keystream(&mut out);
    Ok(out)
}

pub(crate) fn aes_ctr128_encrypt(
    input: &[u8],
    output_size: usize,
    key: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>, TeeStatus> {
    if key.is_empty() || input.is_empty() || output_size == 0 || input.len() > output_size {
        return Err(TeeStatus::SHORT_BUFFER);
    }

    decrypt(key, iv, input)
}

pub(crate) fn copy_secure_memory(input: &[u8], output_size: usize) -> Result<Vec<u8>, TeeStatus> {
    if input.is_empty() || output_size == 0 || input.len() > output_size {
        return Err(TeeStatus::BAD_FORMAT);
    }

    Ok(input.to_vec())
}

/// Walks `descriptor`, copying clear runs and deciphering encrypted runs with
/// the counter restarted at the IV for every run.
pub(crate) fn aes_ctr128_pattern(
    input: &[u8],
    output_size: usize,
    descriptor: &[u8],
    key_iv: &[u8],
) -> Result<Vec<u8>, TeeStatus> {
    if key_iv.len() != AES_KEY_IV_SIZE {
        return Err(TeeStatus::BAD_PARAMETERS);
    }
    let (key, iv) = key_iv.split_at(AES_KEY_SIZE);

    let mut out = Vec::with_capacity(output_size);
    for sample in walk(descriptor) {
        let clear = take(input, out.len(), sample.clear_bytes, output_size)?;
        out.extend_from_slice(clear);

        let encrypted = take(input, out.len(), sample.encrypted_bytes, output_size)?;
        if !encrypted.is_empty() {
            let plain = decrypt(key, iv, encrypted)?;
            out.extend_from_slice(&plain);
        }
    }

    Ok(out)
}

fn take(input: &[u8], pos: usize, len: u32, output_size: usize) -> Result<&[u8], TeeStatus> {
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| pos.checked_add(len))
        .filter(|end| *end <= output_size)
        .ok_or(TeeStatus::SHORT_BUFFER)?;

    input.get(pos..end).ok_or(TeeStatus::SHORT_BUFFER)
}
