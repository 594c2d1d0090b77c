// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use sdpcrypt_core::SecureAddr;
use sdpcrypt_session::SessionConfig;
use sdpcrypt_test_utils::{SimulatedTee, TeeProbe};

use crate::cipher::TeeCipher;
use crate::resolver::SecureMemoryResolver;

/// Regions a live session holds (iv and key).
pub(crate) const SESSION_REGIONS: usize = 2;

pub(crate) const KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

pub(crate) const IV: [u8; 16] = [
    0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0x01, 0x00,
];

pub(crate) fn open_cipher() -> (TeeCipher<SimulatedTee, impl SecureMemoryResolver>, TeeProbe) {
    let tee = SimulatedTee::new();
    let probe = tee.probe();
    let resolver_probe = probe.clone();

    let cipher = TeeCipher::open(
        tee,
        &SessionConfig::default(),
        move |addr: SecureAddr| resolver_probe.resolve(addr),
    )
    .expect("Failed to open(..)");

    (cipher, probe)
}

pub(crate) fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}
