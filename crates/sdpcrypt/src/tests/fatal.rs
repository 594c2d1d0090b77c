// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for the fatal policies. Terminating policies run in a subprocess.

use sdpcrypt_cipher::{CtrOutput, StreamCursor};
use sdpcrypt_core::{Command, CryptoError, SecureAddr, TeeCall, TeeStatus};
use sdpcrypt_test_utils::SimulatedTee;

use crate::config::{Config, FatalPolicy};
use crate::engine::{aes_ctr128_encrypt, copy_secure_memory, crypto_close, crypto_init};
use crate::fatal::{escalate, terminate};

use super::utils::{init_simulated, run_test_as_subprocess};

fn remote_error() -> CryptoError {
    CryptoError::Remote(sdpcrypt_core::TeeError::new(
        TeeCall::InvokeCommand(Command::CopySecureMemory),
        TeeStatus::BAD_FORMAT,
        sdpcrypt_core::ErrorOrigin::TrustedApp,
    ))
}

#[test]
fn test_escalate_returns_recoverable_errors() {
    let err = escalate(FatalPolicy::Exit, CryptoError::InvalidArgument("bad"));
    assert!(matches!(err, CryptoError::InvalidArgument("bad")));

    let err = escalate(FatalPolicy::Abort, CryptoError::UnresolvedHandle(-9));
    assert!(matches!(err, CryptoError::UnresolvedHandle(-9)));
}

#[test]
fn test_propagate_returns_fatal_errors() {
    let err = escalate(FatalPolicy::Propagate, remote_error());
    assert!(matches!(err, CryptoError::Remote(_)));

    let err = terminate(FatalPolicy::Propagate, CryptoError::SessionAlreadyLive);
    assert!(matches!(err, CryptoError::SessionAlreadyLive));
}

#[test]
fn test_exit_policy_on_remote_failure() {
    let exit_code = run_test_as_subprocess("tests::fatal::subprocess_exit_on_remote_failure");
    assert_eq!(exit_code, Some(1), "process should exit with status 1");
}

#[test]
fn test_exit_policy_on_init_failure() {
    let exit_code = run_test_as_subprocess("tests::fatal::subprocess_exit_on_init_failure");
    assert_eq!(exit_code, Some(1), "process should exit with status 1");
}

#[test]
fn test_abort_policy_on_remote_failure() {
    let exit_code = run_test_as_subprocess("tests::fatal::subprocess_abort_on_remote_failure");
    assert_eq!(exit_code, None, "process should be killed by SIGABRT");
}

// =============================================================================
// Subprocess tests
// =============================================================================

#[test]
#[ignore]
fn subprocess_exit_on_remote_failure() {
    let probe = init_simulated(Config::default());
    let mut input = [0u8; 16];
    let mut output = [0u8; 16];
    let mut cursor = StreamCursor::new([0; 16]);
    probe.fail_next(
        TeeCall::InvokeCommand(Command::AesCtr128Encrypt),
        TeeStatus::SECURITY,
    );

    let _ = aes_ctr128_encrypt(
        &mut input,
        CtrOutput::Host(&mut output),
        16,
        &[0; 16],
        &mut cursor,
        0,
    );

    // Only reached if the policy did not exit.
    std::process::exit(0);
}

#[test]
#[ignore]
fn subprocess_exit_on_init_failure() {
    let tee = SimulatedTee::new();
    tee.probe()
        .fail_next(TeeCall::InitializeContext, TeeStatus::COMMUNICATION);

    let _ = crypto_init(tee, |_: SecureAddr| -1, Config::default());

    std::process::exit(0);
}

#[test]
#[ignore]
fn subprocess_abort_on_remote_failure() {
    let probe = init_simulated(Config {
        fatal: FatalPolicy::Abort,
        ..Config::default()
    });
    let (addr, _) = probe.add_secure_buffer(16);
    probe.fail_next(
        TeeCall::InvokeCommand(Command::CopySecureMemory),
        TeeStatus::BAD_FORMAT,
    );

    let _ = copy_secure_memory(&[0u8; 16], addr, 16, 0);
    let _ = crypto_close();

    std::process::exit(0);
}
