// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;

use zeroize::Zeroize;

use sdpcrypt_core::AES_BLOCK_SIZE;

/// Adds `blocks` to the trailing 16 bits of `counter`, big-endian, wrapping.
///
/// The upper 14 bytes never change. This matches the TA's counter layout and
/// aliases after 65536 blocks.
pub fn ctr128_inc(counter: &mut [u8; AES_BLOCK_SIZE], blocks: usize) {
    let [.., hi, lo] = counter;
    let next = u16::from_be_bytes([*hi, *lo]).wrapping_add(blocks as u16);
    let [next_hi, next_lo] = next.to_be_bytes();

    *hi = next_hi;
    *lo = next_lo;
}

/// Position of a caller's CTR stream between calls.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StreamCursor {
    /// Counter block of the next whole block.
    pub iv: [u8; AES_BLOCK_SIZE],
    /// Leading ciphertext bytes of the block the last call ended in.
    pub ecount_buf: [u8; AES_BLOCK_SIZE],
    /// Valid bytes in `ecount_buf`, in `[0, 16)`.
    pub num: u32,
}

impl StreamCursor {
    /// Starts a stream at `iv`.
    pub fn new(iv: [u8; AES_BLOCK_SIZE]) -> Self {
        Self {
            iv,
            ecount_buf: [0; AES_BLOCK_SIZE],
            num: 0,
        }
    }

    /// Carried bytes, as a slice of `ecount_buf`.
    pub fn carry(&self) -> &[u8] {
        let num = (self.num as usize).min(AES_BLOCK_SIZE);
        &self.ecount_buf[..num]
    }

    /// Moves past a block-aligned `window` (carry followed by new input).
    ///
    /// Increments the counter once per whole block and keeps the trailing
    /// partial block as the new carry.
    pub(crate) fn advance(&mut self, window: &[u8]) {
        let blocks = window.len() / AES_BLOCK_SIZE;
        let residual = window.len() % AES_BLOCK_SIZE;

        ctr128_inc(&mut self.iv, blocks);

        self.ecount_buf.zeroize();
        self.ecount_buf[..residual].copy_from_slice(&window[blocks * AES_BLOCK_SIZE..]);
        self.num = residual as u32;
    }
}

impl fmt::Debug for StreamCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCursor")
            .field("num", &self.num)
            .finish_non_exhaustive()
    }
}
