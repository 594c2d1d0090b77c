// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sdpcrypt_core::{
    Backing, Command, ErrorOrigin, LoginMethod, MemFlags, NUM_PARAMS, Operation,
    PARAM_AES_DECRYPTED_BUFFER_IDX, PARAM_AES_ENCRYPTED_BUFFER_IDX, PARAM_AES_IV_IDX,
    PARAM_AES_KEY_IDX, PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
    PARAM_COPY_SECURE_MEMORY_SOURCE_IDX, PARAM_PATTERN_INPUT_IDX, PARAM_PATTERN_KEY_IV_IDX,
    PARAM_PATTERN_OUTPUT_IDX, PARAM_PATTERN_SUBSAMPLES_IDX, Param, ParamType, SecureAddr,
    SecureHandle, SharedRegion, ShmId, TA_AES_DECRYPTOR_UUID, TeeCall, TeeError, TeeStatus,
    Transport, Uuid,
};

use crate::trusted_app;

/// Value the probe's resolver returns for addresses it never handed out.
pub const UNRESOLVED_HANDLE: i32 = -1;

const SECURE_ADDR_BASE: usize = 0x7f00_0000_0000;
const SECURE_ADDR_STRIDE: usize = 0x0010_0000;
const FIRST_SECURE_FD: i32 = 100;

#[derive(Debug, Clone, Copy)]
struct RegionRecord {
    size: usize,
    flags: MemFlags,
}

/// Snapshot of one parameter slot at invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRecord {
    /// Client slot type.
    pub param_type: ParamType,
    /// Parent region, for region-backed slots.
    pub shm: Option<ShmId>,
    /// Secure handle of the parent region, if any.
    pub handle: Option<SecureHandle>,
    /// Window offset.
    pub offset: usize,
    /// Window size.
    pub size: usize,
}

impl SlotRecord {
    fn of(param: &Param<'_>) -> Self {
        Self {
            param_type: param.param_type(),
            shm: param.region().map(SharedRegion::id),
            handle: param.region().and_then(SharedRegion::handle),
            offset: param.offset(),
            size: param.size(),
        }
    }
}

/// One command as the simulated TEE received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command code.
    pub command: Command,
    /// Client type word.
    pub param_types: u32,
    /// Slot snapshots.
    pub slots: [SlotRecord; NUM_PARAMS],
}

impl Invocation {
    fn record(command: Command, op: &Operation<'_>) -> Self {
        Self {
            command,
            param_types: op.param_types(),
            slots: core::array::from_fn(|index| SlotRecord::of(op.param(index))),
        }
    }
}

struct Fault {
    call: TeeCall,
    skip: usize,
    status: TeeStatus,
}

#[derive(Default)]
struct TeeState {
    context_open: bool,
    session: Option<(Uuid, LoginMethod)>,
    handlers_live: bool,
    next_shm: u32,
    regions: BTreeMap<ShmId, RegionRecord>,
    secure: BTreeMap<i32, Vec<u8>>,
    addrs: BTreeMap<usize, i32>,
    faults: Vec<Fault>,
    invocations: Vec<Invocation>,
    leak_warnings: usize,
    unwiped_releases: usize,
    unknown_releases: usize,
}

impl TeeState {
    fn take_fault(&mut self, call: TeeCall) -> Result<(), TeeError> {
        let Some(index) = self.faults.iter().position(|fault| fault.call == call) else {
            return Ok(());
        };
        if self.faults[index].skip > 0 {
            self.faults[index].skip -= 1;
            return Ok(());
        }
        let status = self.faults.remove(index).status;
        let origin = match call {
            TeeCall::InvokeCommand(_) => ErrorOrigin::TrustedApp,
            _ => ErrorOrigin::Api,
        };

        Err(TeeError::new(call, status, origin))
    }

    fn require_context(&self, call: TeeCall) -> Result<(), TeeError> {
        if self.context_open {
            Ok(())
        } else {
            Err(TeeError::new(call, TeeStatus::BAD_STATE, ErrorOrigin::Api))
        }
    }

    fn insert_region(&mut self, size: usize, flags: MemFlags) -> ShmId {
        self.next_shm += 1;
        let id = ShmId::new(self.next_shm);
        self.regions.insert(id, RegionRecord { size, flags });
        id
    }
}

/// Cloneable view of a [`SimulatedTee`]'s state.
#[derive(Clone, Default)]
pub struct TeeProbe {
    state: Arc<Mutex<TeeState>>,
}

impl TeeProbe {
    fn lock(&self) -> MutexGuard<'_, TeeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a zero-filled protected buffer and returns its host address and handle.
    pub fn add_secure_buffer(&self, size: usize) -> (SecureAddr, SecureHandle) {
        let mut state = self.lock();
        let index = state.secure.len();
        let fd = FIRST_SECURE_FD + index as i32;
        let addr = SECURE_ADDR_BASE + index * SECURE_ADDR_STRIDE;

        state.secure.insert(fd, vec![0u8; size]);
        state.addrs.insert(addr, fd);

        let handle = SecureHandle::new(fd).unwrap_or_else(|| unreachable!("fd is positive"));
        (SecureAddr::new(addr), handle)
    }

    /// Maps an address from [`add_secure_buffer`](Self::add_secure_buffer) to its handle.
    pub fn resolve(&self, addr: SecureAddr) -> i32 {
        self.lock()
            .addrs
            .get(&addr.get())
            .copied()
            .unwrap_or(UNRESOLVED_HANDLE)
    }

    /// Contents of a protected buffer.
    pub fn secure_contents(&self, handle: SecureHandle) -> Option<Vec<u8>> {
        self.lock().secure.get(&handle.raw()).cloned()
    }

    /// Makes the next matching call fail with `status`.
    pub fn fail_next(&self, call: TeeCall, status: TeeStatus) {
        self.fail_after(call, 0, status);
    }

    /// Lets `skip` matching calls succeed, then fails the next one with `status`.
    pub fn fail_after(&self, call: TeeCall, skip: usize, status: TeeStatus) {
        self.lock().faults.push(Fault { call, skip, status });
    }

    /// Every invocation received so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    /// Most recent invocation.
    pub fn last_invocation(&self) -> Option<Invocation> {
        self.lock().invocations.last().cloned()
    }

    /// Invocations of `command` received so far.
    pub fn count_invocations(&self, command: Command) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|invocation| invocation.command == command)
            .count()
    }

    /// Regions allocated or registered and not yet released.
    pub fn live_regions(&self) -> usize {
        self.lock().regions.len()
    }

    /// Direction flags of every live region, by id.
    pub fn live_region_flags(&self) -> Vec<(ShmId, usize, MemFlags)> {
        self.lock()
            .regions
            .iter()
            .map(|(id, record)| (*id, record.size, record.flags))
            .collect()
    }

    /// Returns true while a context is open.
    pub fn context_open(&self) -> bool {
        self.lock().context_open
    }

    /// Returns true while a session is open.
    pub fn session_open(&self) -> bool {
        self.lock().session.is_some()
    }

    /// Login method of the open session.
    pub fn session_login(&self) -> Option<LoginMethod> {
        self.lock().session.map(|(_, login)| login)
    }

    /// Returns true between INITIALIZE_HANDLERS and FINALIZE_HANDLERS.
    pub fn handlers_live(&self) -> bool {
        self.lock().handlers_live
    }

    /// Number of times a context was finalized with regions still live.
    pub fn leak_warnings(&self) -> usize {
        self.lock().leak_warnings
    }

    /// Number of allocated regions released while holding non-zero bytes.
    pub fn unwiped_releases(&self) -> usize {
        self.lock().unwiped_releases
    }

    /// Number of releases naming a region that was not live.
    pub fn unknown_releases(&self) -> usize {
        self.lock().unknown_releases
    }
}

/// In-process TEE servicing the AES decryptor commands.
#[derive(Default)]
pub struct SimulatedTee {
    probe: TeeProbe,
    allocations: BTreeMap<ShmId, Vec<u8>>,
}

impl SimulatedTee {
    /// Creates a TEE with no context, session, or protected buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view sharing this TEE's state.
    pub fn probe(&self) -> TeeProbe {
        self.probe.clone()
    }
}

impl Transport for SimulatedTee {
    fn initialize_context(&mut self) -> Result<(), TeeError> {
        let mut state = self.probe.lock();
        state.take_fault(TeeCall::InitializeContext)?;

        if state.context_open {
            return Err(TeeError::new(
                TeeCall::InitializeContext,
                TeeStatus::BAD_STATE,
                ErrorOrigin::Api,
            ));
        }
        state.context_open = true;
        Ok(())
    }

    fn finalize_context(&mut self) {
        let mut state = self.probe.lock();

        if !state.regions.is_empty() {
            tracing::warn!(
                live = state.regions.len(),
                "finalizing context with unreleased shared memory"
            );
            state.leak_warnings += 1;
        }
        state.context_open = false;
    }

    fn open_session(&mut self, uuid: &Uuid, login: LoginMethod) -> Result<(), TeeError> {
        let mut state = self.probe.lock();
        state.take_fault(TeeCall::OpenSession)?;
        state.require_context(TeeCall::OpenSession)?;

        if *uuid != TA_AES_DECRYPTOR_UUID {
            return Err(TeeError::new(
                TeeCall::OpenSession,
                TeeStatus::ITEM_NOT_FOUND,
                ErrorOrigin::Tee,
            ));
        }
        state.session = Some((*uuid, login));
        Ok(())
    }

    fn close_session(&mut self) {
        let mut state = self.probe.lock();
        state.session = None;
        state.handlers_live = false;
    }

    fn allocate_shared_memory(&mut self, size: usize, flags: MemFlags) -> Result<ShmId, TeeError> {
        let mut state = self.probe.lock();
        state.take_fault(TeeCall::AllocateSharedMemory)?;
        state.require_context(TeeCall::AllocateSharedMemory)?;

        let id = state.insert_region(size, flags);
        self.allocations.insert(id, vec![0u8; size]);
        Ok(id)
    }

    fn register_shared_memory(
        &mut self,
        buffer: &[u8],
        flags: MemFlags,
    ) -> Result<ShmId, TeeError> {
        let mut state = self.probe.lock();
        state.take_fault(TeeCall::RegisterSharedMemory)?;
        state.require_context(TeeCall::RegisterSharedMemory)?;

        Ok(state.insert_region(buffer.len(), flags))
    }

    fn register_shared_memory_fd(
        &mut self,
        handle: SecureHandle,
        flags: MemFlags,
    ) -> Result<(ShmId, usize), TeeError> {
        let mut state = self.probe.lock();
        state.take_fault(TeeCall::RegisterSharedMemoryFd)?;
        state.require_context(TeeCall::RegisterSharedMemoryFd)?;

        let Some(size) = state.secure.get(&handle.raw()).map(Vec::len) else {
            return Err(TeeError::new(
                TeeCall::RegisterSharedMemoryFd,
                TeeStatus::BAD_PARAMETERS,
                ErrorOrigin::Api,
            ));
        };

        Ok((state.insert_region(size, flags), size))
    }

    fn shared_memory_mut(&mut self, id: ShmId) -> Option<&mut [u8]> {
        self.allocations.get_mut(&id).map(Vec::as_mut_slice)
    }

    fn release_shared_memory(&mut self, id: ShmId) {
        let mut state = self.probe.lock();

        if state.regions.remove(&id).is_none() {
            tracing::warn!(shm = id.get(), "release of a region that is not live");
            state.unknown_releases += 1;
        }
        if let Some(buffer) = self.allocations.remove(&id) {
            if buffer.iter().any(|byte| *byte != 0) {
                state.unwiped_releases += 1;
            }
        }
    }

    fn invoke_command(&mut self, command: Command, op: &mut Operation<'_>) -> Result<(), TeeError> {
        let call = TeeCall::InvokeCommand(command);
        let mut state = self.probe.lock();
        state.take_fault(call)?;

        if state.session.is_none() {
            return Err(TeeError::new(call, TeeStatus::BAD_STATE, ErrorOrigin::Api));
        }
        state.invocations.push(Invocation::record(command, op));

        for index in 0..NUM_PARAMS {
            if let Some(region) = op.param(index).region() {
                if !state.regions.contains_key(&region.id()) {
                    return Err(TeeError::new(
                        call,
                        TeeStatus::BAD_PARAMETERS,
                        ErrorOrigin::Api,
                    ));
                }
            }
        }

        if op.ta_param_types() != command.ta_signature() {
            return Err(TeeError::new(
                call,
                TeeStatus::BAD_PARAMETERS,
                ErrorOrigin::TrustedApp,
            ));
        }

        service(command, op, &mut state, &mut self.allocations)
            .map_err(|status| TeeError::new(call, status, ErrorOrigin::TrustedApp))
    }
}

fn service(
    command: Command,
    op: &mut Operation<'_>,
    state: &mut TeeState,
    allocations: &mut BTreeMap<ShmId, Vec<u8>>,
) -> Result<(), TeeStatus> {
    match command {
        Command::InitializeHandlers => {
            if state.handlers_live {
                return Err(TeeStatus::BAD_STATE);
            }
            state.handlers_live = true;
            Ok(())
        }
        Command::FinalizeHandlers => {
            if !state.handlers_live {
                return Err(TeeStatus::BAD_STATE);
            }
            state.handlers_live = false;
            Ok(())
        }
        Command::AesCtr128Encrypt => {
            let encrypted = op.param(PARAM_AES_ENCRYPTED_BUFFER_IDX);
            let input = read_slot(encrypted, state, allocations)?;
            let iv = read_slot(op.param(PARAM_AES_IV_IDX), state, allocations)?;
            let key = read_slot(op.param(PARAM_AES_KEY_IDX), state, allocations)?;

            let capacity = op.param(PARAM_AES_DECRYPTED_BUFFER_IDX).size();
            let output = trusted_app::aes_ctr128_encrypt(&input, capacity, &key, &iv)?;
            let slot = op.param_mut(PARAM_AES_DECRYPTED_BUFFER_IDX);
            write_slot(slot, &output, state, allocations)?;
            op.set_updated_size(PARAM_AES_DECRYPTED_BUFFER_IDX, output.len());
            Ok(())
        }
        Command::CopySecureMemory => {
            let source = op.param(PARAM_COPY_SECURE_MEMORY_SOURCE_IDX);
            let input = read_slot(source, state, allocations)?;

            let capacity = op.param(PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX).size();
            let output = trusted_app::copy_secure_memory(&input, capacity)?;
            let slot = op.param_mut(PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX);
            write_slot(slot, &output, state, allocations)?;
            op.set_updated_size(PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX, output.len());
            Ok(())
        }
        Command::AesCtr128SecureEncrypt => {
            let input = read_slot(op.param(PARAM_PATTERN_INPUT_IDX), state, allocations)?;
            let descriptor =
                read_slot(op.param(PARAM_PATTERN_SUBSAMPLES_IDX), state, allocations)?;
            let key_iv = read_slot(op.param(PARAM_PATTERN_KEY_IV_IDX), state, allocations)?;

            let output = trusted_app::aes_ctr128_pattern(
                &input,
                op.param(PARAM_PATTERN_OUTPUT_IDX).size(),
                &descriptor,
                &key_iv,
            )?;
            let slot = op.param_mut(PARAM_PATTERN_OUTPUT_IDX);
            write_slot(slot, &output, state, allocations)?;
            op.set_updated_size(PARAM_PATTERN_OUTPUT_IDX, output.len());
            Ok(())
        }
    }
}

fn read_slot(
    param: &Param<'_>,
    state: &TeeState,
    allocations: &BTreeMap<ShmId, Vec<u8>>,
) -> Result<Vec<u8>, TeeStatus> {
    let (region, offset, size) = match param {
        Param::TmpInput(bytes) => return Ok(bytes.to_vec()),
        Param::Whole(region) => (*region, 0, region.size()),
        Param::PartialInput {
            region,
            offset,
            size,
        } => (*region, *offset, *size),
        _ => return Err(TeeStatus::BAD_PARAMETERS),
    };

    let source = match region.backing() {
        Backing::Allocated => allocations.get(&region.id()).map(Vec::as_slice),
        Backing::Host(bytes) => Some(*bytes),
        Backing::Handle(handle) => state.secure.get(&handle.raw()).map(Vec::as_slice),
    }
    .ok_or(TeeStatus::BAD_PARAMETERS)?;

    let end = offset.checked_add(size).ok_or(TeeStatus::BAD_PARAMETERS)?;
    source
        .get(offset..end)
        .map(<[u8]>::to_vec)
        .ok_or(TeeStatus::BAD_PARAMETERS)
}

fn write_slot(
    param: &mut Param<'_>,
    bytes: &[u8],
    state: &mut TeeState,
    allocations: &mut BTreeMap<ShmId, Vec<u8>>,
) -> Result<(), TeeStatus> {
    let (region, offset, size) = match param {
        Param::TmpOutput(buffer) => {
            let target = buffer
                .get_mut(..bytes.len())
                .ok_or(TeeStatus::SHORT_BUFFER)?;
            target.copy_from_slice(bytes);
            return Ok(());
        }
        Param::Whole(region) => (*region, 0, region.size()),
        Param::PartialOutput {
            region,
            offset,
            size,
        } => (*region, *offset, *size),
        _ => return Err(TeeStatus::BAD_PARAMETERS),
    };

    if bytes.len() > size {
        return Err(TeeStatus::SHORT_BUFFER);
    }

    let target = match region.backing() {
        Backing::Allocated => allocations.get_mut(&region.id()),
        Backing::Handle(handle) => state.secure.get_mut(&handle.raw()),
        Backing::Host(_) => None,
    }
    .ok_or(TeeStatus::ACCESS_DENIED)?;

    let end = offset
        .checked_add(bytes.len())
        .ok_or(TeeStatus::BAD_PARAMETERS)?;
    target
        .get_mut(offset..end)
        .ok_or(TeeStatus::BAD_PARAMETERS)?
        .copy_from_slice(bytes);
    Ok(())
}
