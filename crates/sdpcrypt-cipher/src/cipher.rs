// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

use tracing::trace;
use zeroize::Zeroizing;

use sdpcrypt_core::{
    AES_BLOCK_SIZE, AES_IV_SIZE, AES_KEY_IV_SIZE, AES_KEY_SIZE, Command, CryptoError, MemFlags,
    Operation, PARAM_AES_DECRYPTED_BUFFER_IDX, PARAM_AES_ENCRYPTED_BUFFER_IDX, PARAM_AES_IV_IDX,
    PARAM_AES_KEY_IDX, PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
    PARAM_COPY_SECURE_MEMORY_SOURCE_IDX, PARAM_PATTERN_INPUT_IDX, PARAM_PATTERN_KEY_IV_IDX,
    PARAM_PATTERN_OUTPUT_IDX, PARAM_PATTERN_SUBSAMPLES_IDX, Param, SecureAddr, SecureHandle,
    SharedRegion, SubSampleList, Transport, check_signature,
};
use sdpcrypt_session::{Session, SessionConfig};

use crate::counter::StreamCursor;
use crate::resolver::SecureMemoryResolver;

/// Destination of a CTR128 call.
pub enum CtrOutput<'a> {
    /// Host buffer indexed like the input.
    Host(&'a mut [u8]),
    /// Secure buffer, resolved to a handle and written through the TEE.
    Secure(SecureAddr),
}

impl fmt::Debug for CtrOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtrOutput::Host(buffer) => f.debug_tuple("Host").field(&buffer.len()).finish(),
            CtrOutput::Secure(addr) => f.debug_tuple("Secure").field(addr).finish(),
        }
    }
}

/// Byte ranges of one streaming call.
struct Window {
    /// Start of the block-aligned window (`offset - num`, or `offset` when staged).
    start: usize,
    /// End of the new input (`offset + length`).
    end: usize,
    /// Carry plus new input.
    total: usize,
}

/// Cipher operations over the process's session.
pub struct TeeCipher<T: Transport, R: SecureMemoryResolver> {
    session: Session<T>,
    resolver: R,
}

impl<T: Transport, R: SecureMemoryResolver> TeeCipher<T, R> {
    /// Wraps an open session.
    pub fn new(session: Session<T>, resolver: R) -> Self {
        Self { session, resolver }
    }

    /// Opens the session and wraps it.
    pub fn open(transport: T, config: &SessionConfig, resolver: R) -> Result<Self, CryptoError> {
        Session::open(transport, config).map(|session| Self::new(session, resolver))
    }

    /// Underlying session.
    #[inline]
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Closes the session.
    pub fn close(self) {
        self.session.close();
    }

    /// Deciphers `length` bytes of `input` starting at `offset`, continuing the
    /// stream described by `cursor`.
    ///
    /// When `cursor.num > 0`, the carried ciphertext is first written back into
    /// `input[offset - num..offset]`, and the TA deciphers the block-aligned
    /// window `[offset - num, offset + length)` into the same range of the
    /// output. On success the counter has advanced by one per whole block of
    /// the window and the trailing partial block is the new carry.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidArgument`] if `num >= 16`, nothing is to be
    ///   processed, `offset < num`, or a window exceeds its buffer.
    /// - [`CryptoError::UnresolvedHandle`] if a secure output cannot be resolved.
    /// - [`CryptoError::Remote`] if registration or invocation fails.
    pub fn stream_ctr128(
        &mut self,
        input: &mut [u8],
        output: CtrOutput<'_>,
        length: usize,
        key: &[u8; AES_KEY_SIZE],
        cursor: &mut StreamCursor,
        offset: usize,
    ) -> Result<(), CryptoError> {
        let num = carried(cursor)?;
        let window = frame(length, num, offset, input.len())?;
        if window.total == 0 {
            return Err(CryptoError::InvalidArgument("nothing to process"));
        }
        let start = window.start;

        input[start..offset].copy_from_slice(&cursor.ecount_buf[..num]);
        let ciphertext = &input[start..window.end];

        trace!(length, num, offset, "stream_ctr128");

        match output {
            CtrOutput::Host(out) => {
                let target = out
                    .get_mut(start..window.end)
                    .ok_or(CryptoError::InvalidArgument(
                        "output window exceeds the output buffer",
                    ))?;
                self.run_ctr128(ciphertext, Param::tmp_output(target), key, &cursor.iv)?;
            }
            CtrOutput::Secure(addr) => {
                let handle = self.resolve(addr)?;
                let arena = self.session.arena();
                let region = arena.register_handle_scoped(handle, MemFlags::OUTPUT)?;
                let target = Param::partial_output(&region, start, window.total)?;
                self.run_ctr128(ciphertext, target, key, &cursor.iv)?;
            }
        }

        cursor.advance(ciphertext);
        Ok(())
    }

    /// Like [`stream_ctr128`](Self::stream_ctr128), but never writes to `input`.
    ///
    /// The carry and `input[offset..offset + length]` are assembled in a private
    /// zeroizing buffer. Host output receives exactly `[offset, offset + length)`.
    /// A secure output still receives the whole window at `offset - num`.
    pub fn stream_ctr128_staged(
        &mut self,
        input: &[u8],
        output: CtrOutput<'_>,
        length: usize,
        key: &[u8; AES_KEY_SIZE],
        cursor: &mut StreamCursor,
        offset: usize,
    ) -> Result<(), CryptoError> {
        let num = carried(cursor)?;
        let window = frame(length, 0, offset, input.len())?;
        let total = window.total + num;
        if total == 0 {
            return Err(CryptoError::InvalidArgument("nothing to process"));
        }

        let mut staging = Zeroizing::new(Vec::with_capacity(total));
        staging.extend_from_slice(cursor.carry());
        staging.extend_from_slice(&input[offset..window.end]);

        trace!(length, num, offset, "stream_ctr128_staged");

        match output {
            CtrOutput::Host(out) => {
                let target = out
                    .get_mut(offset..window.end)
                    .ok_or(CryptoError::InvalidArgument(
                        "output window exceeds the output buffer",
                    ))?;
                let mut plaintext = Zeroizing::new(vec![0u8; total]);
                self.run_ctr128(
                    &staging,
                    Param::tmp_output(&mut plaintext),
                    key,
                    &cursor.iv,
                )?;
                target.copy_from_slice(&plaintext[num..]);
            }
            CtrOutput::Secure(addr) => {
                let start = offset.checked_sub(num).ok_or(CryptoError::InvalidArgument(
                    "offset precedes the carried bytes",
                ))?;
                let handle = self.resolve(addr)?;
                let arena = self.session.arena();
                let region = arena.register_handle_scoped(handle, MemFlags::OUTPUT)?;
                let target = Param::partial_output(&region, start, total)?;
                self.run_ctr128(&staging, target, key, &cursor.iv)?;
            }
        }

        cursor.advance(&staging);
        Ok(())
    }

    /// Deciphers a sub-sample pattern from `input` into the secure buffer at
    /// `output`, returning its handle.
    ///
    /// Without `key_iv` the TA receives zeroed key and IV. On success `length`
    /// holds the size the TA reported.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidArgument`] if `input` is shorter than `length`, the
    ///   descriptor covers more than `length` bytes, or the secure buffer is
    ///   smaller than `length`.
    /// - [`CryptoError::UnresolvedHandle`] if `output` cannot be resolved.
    /// - [`CryptoError::RegistrationFailed`] if the secure buffer cannot be
    ///   registered.
    /// - [`CryptoError::Remote`] if the invocation fails.
    pub fn stream_ctr128_pattern(
        &mut self,
        input: &[u8],
        output: SecureAddr,
        samples: &SubSampleList,
        key_iv: Option<(&[u8; AES_KEY_SIZE], &[u8; AES_IV_SIZE])>,
        length: &mut u32,
    ) -> Result<SecureHandle, CryptoError> {
        let size = *length as usize;
        let source = input.get(..size).ok_or(CryptoError::InvalidArgument(
            "input is shorter than the pattern length",
        ))?;
        if samples.covered_bytes() > u64::from(*length) {
            return Err(CryptoError::InvalidArgument(
                "sub-samples cover more bytes than the pattern length",
            ));
        }

        let handle = self.resolve(output)?;
        let arena = self.session.arena();
        let region = arena
            .register_handle_scoped(handle, MemFlags::INOUT)
            .map_err(CryptoError::RegistrationFailed)?;

        let mut key_and_iv = Zeroizing::new([0u8; AES_KEY_IV_SIZE]);
        if let Some((key, iv)) = key_iv {
            let (key_part, iv_part) = key_and_iv.split_at_mut(AES_KEY_SIZE);
            key_part.copy_from_slice(key);
            iv_part.copy_from_slice(iv);
        }

        trace!(
            length = size,
            records = samples.len(),
            fd = handle.raw(),
            "stream_ctr128_pattern"
        );

        let target = Param::partial_output(&region, 0, size)?;
        let descriptor = Param::tmp_input(samples.as_bytes());
        let mut op = Operation::empty();
        op.set(PARAM_PATTERN_INPUT_IDX, Param::tmp_input(source))
            .set(PARAM_PATTERN_OUTPUT_IDX, target)
            .set(PARAM_PATTERN_SUBSAMPLES_IDX, descriptor)
            .set(PARAM_PATTERN_KEY_IV_IDX, Param::tmp_input(&key_and_iv[..]));
        check_signature(Command::AesCtr128SecureEncrypt, &op)?;
        arena.invoke(Command::AesCtr128SecureEncrypt, &mut op)?;

        if let Some(produced) = op
            .updated_size(PARAM_PATTERN_OUTPUT_IDX)
            .and_then(|produced| u32::try_from(produced).ok())
        {
            *length = produced;
        }

        Ok(handle)
    }

    /// Copies `input[offset..offset + length]` into the secure buffer at `output`,
    /// at the same offset.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidArgument`] if `length` is zero, the source window
    ///   exceeds `input`, or the destination is smaller than `offset + length`.
    /// - [`CryptoError::UnresolvedHandle`] if `output` cannot be resolved.
    /// - [`CryptoError::Remote`] if registration or invocation fails.
    pub fn copy_to_secure(
        &mut self,
        input: &[u8],
        output: SecureAddr,
        length: usize,
        offset: usize,
    ) -> Result<(), CryptoError> {
        if length == 0 {
            return Err(CryptoError::InvalidArgument("copy length is zero"));
        }
        let source = offset
            .checked_add(length)
            .and_then(|end| input.get(offset..end))
            .ok_or(CryptoError::InvalidArgument(
                "copy source exceeds the input buffer",
            ))?;

        let handle = self.resolve(output)?;
        let arena = self.session.arena();
        let src = arena.register_host_scoped(source, MemFlags::INPUT)?;
        let dst = arena.register_handle_scoped(handle, MemFlags::OUTPUT)?;

        trace!(length, offset, fd = handle.raw(), "copy_to_secure");

        let mut op = Operation::empty();
        op.set(
            PARAM_COPY_SECURE_MEMORY_SOURCE_IDX,
            Param::partial_input(&src, 0, length)?,
        )
        .set(
            PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
            Param::partial_output(&dst, offset, length)?,
        );
        check_signature(Command::CopySecureMemory, &op)?;
        arena.invoke(Command::CopySecureMemory, &mut op)?;

        Ok(())
    }

    fn resolve(&self, addr: SecureAddr) -> Result<SecureHandle, CryptoError> {
        SecureHandle::try_from(self.resolver.resolve(addr))
    }

    fn session_regions(
        &self,
    ) -> Result<(&SharedRegion<'static>, &SharedRegion<'static>), CryptoError> {
        let iv = self.session.iv_region().ok_or(CryptoError::NotInitialized)?;
        let key = self
            .session
            .key_region()
            .ok_or(CryptoError::NotInitialized)?;
        Ok((iv, key))
    }

    /// Fills the session's IV and key regions, invokes CTR128 with `ciphertext`
    /// as the encrypted slot and `output` as the decrypted slot, then wipes both regions.
    fn run_ctr128(
        &self,
        ciphertext: &[u8],
        output: Param<'_>,
        key: &[u8; AES_KEY_SIZE],
        iv: &[u8; AES_BLOCK_SIZE],
    ) -> Result<(), CryptoError> {
        let (iv_region, key_region) = self.session_regions()?;
        let arena = self.session.arena();

        let result = arena
            .fill(iv_region, iv)
            .and_then(|()| arena.fill(key_region, key))
            .and_then(|()| {
                let mut op = Operation::empty();
                op.set(PARAM_AES_ENCRYPTED_BUFFER_IDX, Param::tmp_input(ciphertext))
                    .set(PARAM_AES_DECRYPTED_BUFFER_IDX, output)
                    .set(PARAM_AES_IV_IDX, Param::whole(iv_region))
                    .set(PARAM_AES_KEY_IDX, Param::whole(key_region));
                check_signature(Command::AesCtr128Encrypt, &op)?;
                arena.invoke(Command::AesCtr128Encrypt, &mut op)?;
                Ok(())
            });

        arena.wipe(iv_region);
        arena.wipe(key_region);
        result
    }
}

impl<T: Transport, R: SecureMemoryResolver> fmt::Debug for TeeCipher<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeCipher")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn carried(cursor: &StreamCursor) -> Result<usize, CryptoError> {
    let num = cursor.num as usize;
    if num >= AES_BLOCK_SIZE {
        return Err(CryptoError::InvalidArgument(
            "block offset must be below the block size",
        ));
    }
    Ok(num)
}

/// Frames `[offset - num, offset + length)` within an input of `input_len` bytes.
fn frame(
    length: usize,
    num: usize,
    offset: usize,
    input_len: usize,
) -> Result<Window, CryptoError> {
    let total = length
        .checked_add(num)
        .ok_or(CryptoError::InvalidArgument("window length overflows"))?;
    let start = offset.checked_sub(num).ok_or(CryptoError::InvalidArgument(
        "offset precedes the carried bytes",
    ))?;
    let end = offset
        .checked_add(length)
        .filter(|end| *end <= input_len)
        .ok_or(CryptoError::InvalidArgument(
            "input window exceeds the input buffer",
        ))?;

    Ok(Window { start, end, total })
}
