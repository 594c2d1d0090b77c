// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, warn};

use sdpcrypt_core::{
    AES_IV_SIZE, AES_KEY_SIZE, Command, CryptoError, MemFlags, Operation, SharedRegion, Transport,
};
use sdpcrypt_shm::Arena;

use crate::config::SessionConfig;

/// No session in this process.
const STATE_IDLE: u8 = 0;
/// A session is being opened.
const STATE_OPENING: u8 = 1;
/// A session is open.
const STATE_LIVE: u8 = 2;

static SESSION_STATE: AtomicU8 = AtomicU8::new(STATE_IDLE);

/// Returns true while a [`Session`] is open in this process.
pub fn is_session_live() -> bool {
    SESSION_STATE.load(Ordering::Acquire) == STATE_LIVE
}

struct SessionRegions {
    iv: SharedRegion<'static>,
    key: SharedRegion<'static>,
}

/// The process's single session to the trusted application.
pub struct Session<T: Transport> {
    arena: Arena<T>,
    regions: Option<SessionRegions>,
    handler_lifecycle: bool,
}

impl<T: Transport> Session<T> {
    /// Creates the context, opens the session, initializes the TA handlers and
    /// allocates the IV and key regions.
    ///
    /// Every step that succeeded is undone if a later one fails. Fails with
    /// [`CryptoError::SessionAlreadyLive`] while another session is open.
    pub fn open(transport: T, config: &SessionConfig) -> Result<Self, CryptoError> {
        SESSION_STATE
            .compare_exchange(
                STATE_IDLE,
                STATE_OPENING,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .map_err(|_| CryptoError::SessionAlreadyLive)?;

        match Self::establish(transport, config) {
            Ok(session) => {
                SESSION_STATE.store(STATE_LIVE, Ordering::Release);
                debug!(
                    uuid = %config.uuid,
                    login = ?config.login,
                    "session opened"
                );
                Ok(session)
            }
            Err(err) => {
                SESSION_STATE.store(STATE_IDLE, Ordering::Release);
                Err(err)
            }
        }
    }

    fn establish(mut transport: T, config: &SessionConfig) -> Result<Self, CryptoError> {
        transport.initialize_context()?;

        if let Err(err) = transport.open_session(&config.uuid, config.login) {
            transport.finalize_context();
            return Err(err.into());
        }

        let arena = Arena::new(transport);

        if config.handler_lifecycle {
            if let Err(err) = arena.invoke(Command::InitializeHandlers, &mut Operation::empty()) {
                shutdown(&arena, false);
                return Err(err.into());
            }
        }

        let iv = match arena.allocate(AES_IV_SIZE, MemFlags::INPUT) {
            Ok(region) => region,
            Err(err) => {
                shutdown(&arena, config.handler_lifecycle);
                return Err(err.into());
            }
        };
        let key = match arena.allocate(AES_KEY_SIZE, MemFlags::INPUT) {
            Ok(region) => region,
            Err(err) => {
                arena.release(iv);
                shutdown(&arena, config.handler_lifecycle);
                return Err(err.into());
            }
        };

        Ok(Self {
            arena,
            regions: Some(SessionRegions { iv, key }),
            handler_lifecycle: config.handler_lifecycle,
        })
    }

    /// Arena of this session.
    #[inline]
    pub fn arena(&self) -> &Arena<T> {
        &self.arena
    }

    /// 16-byte input region holding the counter block during one invocation.
    #[inline]
    pub fn iv_region(&self) -> Option<&SharedRegion<'static>> {
        self.regions.as_ref().map(|regions| &regions.iv)
    }

    /// 16-byte input region holding the key during one invocation.
    #[inline]
    pub fn key_region(&self) -> Option<&SharedRegion<'static>> {
        self.regions.as_ref().map(|regions| &regions.key)
    }

    /// Returns true until the session is torn down.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.regions.is_some()
    }

    /// Tears the session down.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(SessionRegions { iv, key }) = self.regions.take() else {
            return;
        };

        self.arena.wipe(&iv);
        self.arena.release(iv);
        self.arena.wipe(&key);
        self.arena.release(key);

        shutdown(&self.arena, self.handler_lifecycle);
        SESSION_STATE.store(STATE_IDLE, Ordering::Release);

        debug!("session closed");
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.is_open())
            .field("arena", &self.arena)
            .finish_non_exhaustive()
    }
}

/// Finalizes the TA handlers (if they were initialized), closes the session and
/// finalizes the context.
fn shutdown<T: Transport>(arena: &Arena<T>, handlers: bool) {
    if handlers {
        if let Err(err) = arena.invoke(Command::FinalizeHandlers, &mut Operation::empty()) {
            warn!(%err, "finalizing handlers failed");
        }
    }

    arena.with_transport(|transport| {
        transport.close_session();
        transport.finalize_context();
    });
}
