// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::consts::{
    PARAM_AES_DECRYPTED_BUFFER_IDX, PARAM_AES_ENCRYPTED_BUFFER_IDX, PARAM_AES_IV_IDX,
    PARAM_AES_KEY_IDX, PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
    PARAM_COPY_SECURE_MEMORY_SOURCE_IDX,
};
use crate::operation::{Operation, param_type_at, param_types};
use crate::param::{Param, ParamType};
use crate::region::{Backing, MemFlags, SharedRegion, ShmId};
use crate::signature::{AES_CTR128_ENCRYPT_PARAM_TYPES, COPY_SECURE_MEMORY_PARAM_TYPES};

#[test]
fn test_param_types_packs_slot_i_at_bits_4i() {
    let word = param_types(
        ParamType::ValueInput,
        ParamType::ValueOutput,
        ParamType::ValueInout,
        ParamType::MemrefWhole,
    );

    assert_eq!(word, 0xC321);
    assert_eq!(param_type_at(word, 0), 0x1);
    assert_eq!(param_type_at(word, 1), 0x2);
    assert_eq!(param_type_at(word, 2), 0x3);
    assert_eq!(param_type_at(word, 3), 0xC);
}

#[test]
fn test_empty_operation_has_zero_type_word() {
    let op = Operation::empty();

    assert_eq!(op.param_types(), 0);
    assert_eq!(op.ta_param_types(), 0);
}

#[test]
fn test_operation_type_word_follows_slots() {
    let iv = SharedRegion::new(ShmId::new(1), 16, MemFlags::INPUT, Backing::Allocated);
    let key = SharedRegion::new(ShmId::new(2), 16, MemFlags::INPUT, Backing::Allocated);
    let input = [0u8; 8];
    let mut output = [0u8; 8];

    let op = Operation::new(
        Param::tmp_input(&input),
        Param::tmp_output(&mut output),
        Param::whole(&iv),
        Param::whole(&key),
    );

    assert_eq!(op.param_types(), 0xCC65);
    assert_eq!(op.ta_param_types(), 0x5565);
}

#[test]
fn test_whole_inout_region_translates_to_inout() {
    let region = SharedRegion::new(ShmId::new(7), 32, MemFlags::INOUT, Backing::Allocated);
    let op = Operation::new(Param::whole(&region), Param::None, Param::None, Param::None);

    assert_eq!(op.ta_param_types(), 0x7);
}

#[test]
fn test_updated_size_defaults_to_none() {
    let mut op = Operation::empty();
    assert_eq!(op.updated_size(1), None);

    op.set_updated_size(1, 42);
    assert_eq!(op.updated_size(1), Some(42));

    // Out of range is ignored.
    op.set_updated_size(9, 1);
    assert_eq!(op.updated_size(9), None);
}

#[test]
fn test_tmp_output_is_writable_through_param_mut() {
    let mut output = [0u8; 4];
    {
        let mut op = Operation::new(
            Param::None,
            Param::tmp_output(&mut output),
            Param::None,
            Param::None,
        );

        if let Param::TmpOutput(buffer) = op.param_mut(1) {
            buffer.copy_from_slice(&[1, 2, 3, 4]);
        }
    }

    assert_eq!(output, [1, 2, 3, 4]);
}

#[test]
fn test_set_places_params_at_named_slots() {
    let iv = SharedRegion::new(ShmId::new(1), 16, MemFlags::INPUT, Backing::Allocated);
    let key = SharedRegion::new(ShmId::new(2), 16, MemFlags::INPUT, Backing::Allocated);
    let input = [0u8; 8];
    let mut output = [0u8; 8];
    let decrypted = Param::tmp_output(&mut output);

    let mut op = Operation::empty();
    op.set(PARAM_AES_KEY_IDX, Param::whole(&key))
        .set(PARAM_AES_IV_IDX, Param::whole(&iv))
        .set(PARAM_AES_DECRYPTED_BUFFER_IDX, decrypted)
        .set(PARAM_AES_ENCRYPTED_BUFFER_IDX, Param::tmp_input(&input));

    assert_eq!(op.param_types(), AES_CTR128_ENCRYPT_PARAM_TYPES);
    assert_eq!(
        op.param(PARAM_AES_IV_IDX).region().map(SharedRegion::id),
        Some(ShmId::new(1))
    );
    assert_eq!(
        op.param(PARAM_AES_KEY_IDX).region().map(SharedRegion::id),
        Some(ShmId::new(2))
    );
}

#[test]
fn test_set_replaces_previous_param() {
    let src = SharedRegion::new(ShmId::new(3), 32, MemFlags::INPUT, Backing::Allocated);
    let dst = SharedRegion::new(ShmId::new(4), 32, MemFlags::OUTPUT, Backing::Allocated);
    let buf = [0u8; 4];

    let mut op = Operation::empty();
    op.set(PARAM_COPY_SECURE_MEMORY_SOURCE_IDX, Param::tmp_input(&buf));
    op.set(
        PARAM_COPY_SECURE_MEMORY_SOURCE_IDX,
        Param::partial_input(&src, 0, 8).expect("Failed to partial_input(..)"),
    )
    .set(
        PARAM_COPY_SECURE_MEMORY_DESTINATION_IDX,
        Param::partial_output(&dst, 8, 8).expect("Failed to partial_output(..)"),
    );

    assert_eq!(op.param_types(), COPY_SECURE_MEMORY_PARAM_TYPES);
}

#[test]
#[should_panic]
fn test_set_out_of_range_panics() {
    let mut op = Operation::empty();
    op.set(4, Param::None);
}
