// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for copying clear bytes into secure memory.

use serial_test::serial;

use sdpcrypt_core::{Command, CryptoError, ParamType, SecureAddr, TeeCall, TeeStatus};

use super::utils::{SESSION_REGIONS, open_cipher, plaintext};

#[test]
#[serial(session)]
fn test_copy_at_offset() {
    let (mut cipher, probe) = open_cipher();
    let (addr, handle) = probe.add_secure_buffer(192);
    let input = plaintext(192);

    cipher
        .copy_to_secure(&input, addr, 64, 128)
        .expect("Failed to copy_to_secure(..)");

    let invocation = probe.last_invocation().expect("Failed to last_invocation()");
    assert_eq!(invocation.command, Command::CopySecureMemory);
    assert_eq!(invocation.param_types, 0x00ED);

    let [src, dst, third, fourth] = invocation.slots;
    assert_eq!(src.param_type, ParamType::MemrefPartialInput);
    assert!(src.shm.is_some());
    assert_eq!(src.handle, None);
    assert_eq!((src.offset, src.size), (0, 64));
    assert_eq!(dst.param_type, ParamType::MemrefPartialOutput);
    assert_eq!(dst.handle, Some(handle));
    assert_eq!((dst.offset, dst.size), (128, 64));
    assert_eq!(third.param_type, ParamType::None);
    assert_eq!(fourth.param_type, ParamType::None);

    let contents = probe
        .secure_contents(handle)
        .expect("Failed to secure_contents(..)");
    assert!(contents[..128].iter().all(|b| *b == 0));
    assert_eq!(&contents[128..], &input[128..]);
    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
    assert_eq!(probe.unknown_releases(), 0);
}

#[test]
#[serial(session)]
fn test_destination_too_small() {
    let (mut cipher, probe) = open_cipher();
    let (addr, _) = probe.add_secure_buffer(100);
    let input = plaintext(128);

    let err = cipher
        .copy_to_secure(&input, addr, 64, 64)
        .expect_err("Failed to reject a short destination");

    assert!(matches!(err, CryptoError::InvalidArgument(_)));
    assert_eq!(probe.count_invocations(Command::CopySecureMemory), 0);
    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
}

#[test]
#[serial(session)]
fn test_invalid_copy_windows() {
    let (mut cipher, probe) = open_cipher();
    let (addr, _) = probe.add_secure_buffer(64);
    let input = plaintext(32);

    let empty = cipher.copy_to_secure(&input, addr, 0, 0);
    assert!(matches!(empty, Err(CryptoError::InvalidArgument(_))));

    let overrun = cipher.copy_to_secure(&input, addr, 16, 20);
    assert!(matches!(overrun, Err(CryptoError::InvalidArgument(_))));

    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
}

#[test]
#[serial(session)]
fn test_copy_unresolved_destination() {
    let (mut cipher, probe) = open_cipher();
    let input = plaintext(16);

    let err = cipher
        .copy_to_secure(&input, SecureAddr::new(0x42), 16, 0)
        .expect_err("Failed to reject an unknown address");

    assert!(matches!(err, CryptoError::UnresolvedHandle(_)));
    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
}

#[test]
#[serial(session)]
fn test_copy_remote_failure_releases_both_regions() {
    let (mut cipher, probe) = open_cipher();
    let (addr, _) = probe.add_secure_buffer(16);
    let input = plaintext(16);
    probe.fail_next(
        TeeCall::InvokeCommand(Command::CopySecureMemory),
        TeeStatus::BAD_FORMAT,
    );

    let err = cipher
        .copy_to_secure(&input, addr, 16, 0)
        .expect_err("Failed to surface the remote failure");

    assert!(matches!(err, CryptoError::Remote(_)));
    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
}

#[test]
#[serial(session)]
fn test_destination_registration_failure_releases_source() {
    let (mut cipher, probe) = open_cipher();
    let (addr, _) = probe.add_secure_buffer(16);
    let input = plaintext(16);
    probe.fail_next(TeeCall::RegisterSharedMemoryFd, TeeStatus::OUT_OF_MEMORY);

    let err = cipher
        .copy_to_secure(&input, addr, 16, 0)
        .expect_err("Failed to surface the registration failure");

    assert!(matches!(err, CryptoError::Remote(_)));
    assert_eq!(probe.live_regions(), SESSION_REGIONS);

    cipher.close();
}
