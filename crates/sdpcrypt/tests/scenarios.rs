// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! End-to-end decryption scenarios through the public entry points.

use serial_test::serial;

use sdpcrypt::{
    Command, Config, CtrOutput, FatalPolicy, SecureAddr, StreamCursor, SubSample, SubSampleList,
    aes_ctr128_encrypt, aes_ctr128_encrypt_secure, copy_secure_memory, crypto_close, crypto_init,
};
use sdpcrypt_core::{
    COPY_SECURE_MEMORY_PARAM_TYPES, PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
    PARAM_COPY_SECURE_MEMORY_SOURCE_IDX, ParamType,
};
use sdpcrypt_test_utils::{SimulatedTee, TeeProbe, aes_ctr128};

fn init() -> TeeProbe {
    let tee = SimulatedTee::new();
    let probe = tee.probe();
    let resolver = probe.clone();

    crypto_init(
        tee,
        move |addr: SecureAddr| resolver.resolve(addr),
        Config {
            fatal: FatalPolicy::Propagate,
            ..Config::default()
        },
    )
    .expect("Failed to crypto_init(..)");

    probe
}

fn low16(counter: &[u8; 16]) -> u16 {
    u16::from_be_bytes([counter[14], counter[15]])
}

#[test]
#[serial(session)]
fn test_single_aligned_block() {
    init();
    let mut input = [0u8; 16];
    let mut output = [0u8; 16];
    let mut cursor = StreamCursor::new([0; 16]);

    aes_ctr128_encrypt(
        &mut input,
        CtrOutput::Host(&mut output),
        16,
        &[0; 16],
        &mut cursor,
        0,
    )
    .expect("Failed to aes_ctr128_encrypt(..)");

    assert_eq!(cursor.num, 0);
    assert_eq!(low16(&cursor.iv), 1);
    assert!(cursor.iv[..14].iter().all(|b| *b == 0));
    assert_eq!(output.to_vec(), aes_ctr128(&[0; 16], &[0; 16], &[0; 16]));

    crypto_close().expect("Failed to crypto_close()");
}

#[test]
#[serial(session)]
fn test_two_unaligned_chunks() {
    init();
    let plain: Vec<u8> = (0..32u8).map(|b| b ^ 0x5C).collect();
    let ciphertext = aes_ctr128(&[0; 16], &[0; 16], &plain);

    let mut input = ciphertext.clone();
    let mut output = vec![0u8; 32];
    let mut cursor = StreamCursor::new([0; 16]);

    aes_ctr128_encrypt(
        &mut input,
        CtrOutput::Host(&mut output),
        20,
        &[0; 16],
        &mut cursor,
        0,
    )
    .expect("Failed to aes_ctr128_encrypt(..)");
    assert_eq!(cursor.num, 4);

    aes_ctr128_encrypt(
        &mut input,
        CtrOutput::Host(&mut output),
        12,
        &[0; 16],
        &mut cursor,
        20,
    )
    .expect("Failed to aes_ctr128_encrypt(..)");

    assert_eq!(cursor.num, 0);
    assert_eq!(low16(&cursor.iv), 2);
    assert_eq!(output, plain);

    crypto_close().expect("Failed to crypto_close()");
}

#[test]
#[serial(session)]
fn test_counter_wrap() {
    init();
    let mut iv = [0x33u8; 16];
    iv[14] = 0xFF;
    iv[15] = 0xFF;
    let mut input = [0u8; 16];
    let mut output = [0u8; 16];
    let mut cursor = StreamCursor::new(iv);

    aes_ctr128_encrypt(
        &mut input,
        CtrOutput::Host(&mut output),
        16,
        &[0; 16],
        &mut cursor,
        0,
    )
    .expect("Failed to aes_ctr128_encrypt(..)");

    assert_eq!(low16(&cursor.iv), 0);
    assert!(cursor.iv[..14].iter().all(|b| *b == 0x33));

    crypto_close().expect("Failed to crypto_close()");
}

#[test]
#[serial(session)]
fn test_sub_sample_pattern() {
    let probe = init();
    let (addr, handle) = probe.add_secure_buffer(32);
    let key = [0x01; 16];
    let iv = [0x02; 16];
    let plain: Vec<u8> = (0..32u8).collect();

    let mut input = plain[..5].to_vec();
    input.extend(aes_ctr128(&key, &iv, &plain[5..16]));
    input.extend(aes_ctr128(&key, &iv, &plain[16..32]));

    let samples = SubSampleList::new(&[SubSample::new(5, 11), SubSample::new(0, 16)])
        .expect("Failed to new(..)");
    let mut length = 32u32;

    aes_ctr128_encrypt_secure(&input, addr, &samples, Some((&key, &iv)), &mut length)
        .expect("Failed to aes_ctr128_encrypt_secure(..)");

    assert_eq!(
        probe
            .secure_contents(handle)
            .expect("Failed to secure_contents(..)"),
        plain
    );
    assert_eq!(probe.live_regions(), 2);

    crypto_close().expect("Failed to crypto_close()");
}

#[test]
#[serial(session)]
fn test_secure_copy() {
    let probe = init();
    let (addr, handle) = probe.add_secure_buffer(192);
    let input: Vec<u8> = (0..192).map(|i| i as u8).collect();

    copy_secure_memory(&input, addr, 64, 128).expect("Failed to copy_secure_memory(..)");

    let invocation = probe.last_invocation().expect("Failed to last_invocation()");
    assert_eq!(invocation.command, Command::CopySecureMemory);
    assert_eq!(invocation.param_types, COPY_SECURE_MEMORY_PARAM_TYPES);

    let source = &invocation.slots[PARAM_COPY_SECURE_MEMORY_SOURCE_IDX];
    let destination = &invocation.slots[PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX];
    assert_eq!((source.offset, source.size), (0, 64));
    assert_eq!(destination.handle, Some(handle));
    assert_eq!((destination.offset, destination.size), (128, 64));
    assert_eq!(invocation.slots[2].param_type, ParamType::None);
    assert_eq!(invocation.slots[3].param_type, ParamType::None);
    assert_eq!(probe.live_regions(), 2);

    crypto_close().expect("Failed to crypto_close()");
    assert_eq!(probe.live_regions(), 0);
}

#[test]
#[serial(session)]
fn test_double_init_double_close() {
    let probe = init();
    init();

    crypto_close().expect("Failed to crypto_close()");
    crypto_close().expect("Failed to crypto_close()");

    assert_eq!(probe.live_regions(), 0);
    assert_eq!(probe.leak_warnings(), 0);
    assert!(!probe.context_open());
}
