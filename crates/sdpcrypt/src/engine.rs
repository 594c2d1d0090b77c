// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process-wide engine behind the entry points.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use sdpcrypt_cipher::{CtrOutput, SecureMemoryResolver, StreamCursor, TeeCipher};
use sdpcrypt_core::{
    AES_IV_SIZE, AES_KEY_SIZE, CryptoError, SecureAddr, SecureHandle, SubSampleList, Transport,
};

use crate::config::{CarryMode, Config, FatalPolicy};
use crate::fatal;

type DynTransport = Box<dyn Transport + Send>;
type DynResolver = Box<dyn Fn(SecureAddr) -> i32 + Send>;

struct Engine {
    cipher: TeeCipher<DynTransport, DynResolver>,
    fatal: FatalPolicy,
    carry: CarryMode,
}

static ENGINE: Mutex<Option<Engine>> = Mutex::new(None);

fn lock() -> Result<MutexGuard<'static, Option<Engine>>, CryptoError> {
    ENGINE.lock().map_err(|_| CryptoError::LockPoisoned)
}

/// Runs `f` on the open engine, applying its fatal policy to the result.
fn with_engine<R>(f: impl FnOnce(&mut Engine) -> Result<R, CryptoError>) -> Result<R, CryptoError> {
    let mut guard = lock()?;
    let engine = guard.as_mut().ok_or(CryptoError::NotInitialized)?;
    let policy = engine.fatal;

    f(engine).map_err(|err| fatal::escalate(policy, err))
}

/// Opens the session over `transport`.
///
/// No-op when a session is already open; `transport` and `resolver` are then
/// dropped. Any failure while opening goes through `config.fatal`.
pub fn crypto_init<T, R>(transport: T, resolver: R, config: Config) -> Result<(), CryptoError>
where
    T: Transport + Send + 'static,
    R: SecureMemoryResolver + Send + 'static,
{
    let mut engine = lock()?;
    if engine.is_some() {
        debug!("crypto already initialized");
        return Ok(());
    }

    let transport: DynTransport = Box::new(transport);
    let resolver: DynResolver = Box::new(move |addr: SecureAddr| resolver.resolve(addr));

    let cipher = TeeCipher::open(transport, &config.session, resolver)
        .map_err(|err| fatal::terminate(config.fatal, err))?;

    *engine = Some(Engine {
        cipher,
        fatal: config.fatal,
        carry: config.carry,
    });
    debug!(fatal = ?config.fatal, carry = ?config.carry, "crypto initialized");

    Ok(())
}

/// Closes the session. No-op when none is open.
pub fn crypto_close() -> Result<(), CryptoError> {
    let engine = lock()?.take();

    match engine {
        Some(engine) => {
            engine.cipher.close();
            debug!("crypto closed");
        }
        None => debug!("crypto not initialized, nothing to close"),
    }

    Ok(())
}

/// Returns true between [`crypto_init`] and [`crypto_close`].
pub fn is_initialized() -> bool {
    lock().map(|engine| engine.is_some()).unwrap_or(false)
}

/// Deciphers `length` bytes of `input` at `offset`, continuing `cursor`.
///
/// With [`CarryMode::InPlace`] the carried bytes are written back into
/// `input[offset - num..offset]`; with [`CarryMode::Staged`] `input` is left
/// untouched.
///
/// # Errors
///
/// [`CryptoError::InvalidArgument`] if `key` is not 16 bytes, plus everything
/// [`TeeCipher::stream_ctr128`] returns.
pub fn aes_ctr128_encrypt(
    input: &mut [u8],
    output: CtrOutput<'_>,
    length: usize,
    key: &[u8],
    cursor: &mut StreamCursor,
    offset: usize,
) -> Result<(), CryptoError> {
    let key = key_block(key)?;

    with_engine(|engine| match engine.carry {
        CarryMode::InPlace => engine
            .cipher
            .stream_ctr128(input, output, length, key, cursor, offset),
        CarryMode::Staged => engine
            .cipher
            .stream_ctr128_staged(input, output, length, key, cursor, offset),
    })
}

/// Deciphers the sub-sample pattern of `input` into the secure buffer at
/// `output`. See [`TeeCipher::stream_ctr128_pattern`].
pub fn aes_ctr128_encrypt_secure(
    input: &[u8],
    output: SecureAddr,
    samples: &SubSampleList,
    key_iv: Option<(&[u8; AES_KEY_SIZE], &[u8; AES_IV_SIZE])>,
    length: &mut u32,
) -> Result<SecureHandle, CryptoError> {
    with_engine(|engine| {
        engine
            .cipher
            .stream_ctr128_pattern(input, output, samples, key_iv, length)
    })
}

/// Copies `input[offset..offset + length]` into the secure buffer at `output`.
/// See [`TeeCipher::copy_to_secure`].
pub fn copy_secure_memory(
    input: &[u8],
    output: SecureAddr,
    length: usize,
    offset: usize,
) -> Result<(), CryptoError> {
    with_engine(|engine| engine.cipher.copy_to_secure(input, output, length, offset))
}

fn key_block(key: &[u8]) -> Result<&[u8; AES_KEY_SIZE], CryptoError> {
    key.try_into()
        .map_err(|_| CryptoError::InvalidArgument("key must be 16 bytes"))
}
