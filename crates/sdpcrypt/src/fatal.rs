// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use tracing::error;

use sdpcrypt_core::CryptoError;

use crate::config::FatalPolicy;

/// Applies `policy` to fatal errors and hands recoverable ones back.
pub(crate) fn escalate(policy: FatalPolicy, err: CryptoError) -> CryptoError {
    if err.is_fatal() {
        terminate(policy, err)
    } else {
        err
    }
}

/// Applies `policy` to `err` regardless of its class.
pub(crate) fn terminate(policy: FatalPolicy, err: CryptoError) -> CryptoError {
    if policy == FatalPolicy::Propagate {
        return err;
    }

    match &err {
        CryptoError::Remote(tee) | CryptoError::RegistrationFailed(tee) => error!(
            call = %tee.call,
            status = %tee.status,
            origin = %tee.origin,
            "TEE call failed"
        ),
        _ => error!(error = %err, "TEE call failed"),
    }

    match policy {
        FatalPolicy::Abort => unsafe { libc::abort() },
        _ => std::process::exit(1),
    }
}
