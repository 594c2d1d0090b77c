// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::CryptoError;
use crate::subsample::{SUB_SAMPLE_RECORD_SIZE, SUB_SAMPLE_SENTINEL, SubSample, SubSampleList, walk};

fn encode(records: &[(u32, u32)]) -> Vec<u8> {
    records
        .iter()
        .flat_map(|(clear, encrypted)| {
            let mut record = clear.to_ne_bytes().to_vec();
            record.extend_from_slice(&encrypted.to_ne_bytes());
            record
        })
        .collect()
}

// =============================================================================
// SubSampleList::new()
// =============================================================================

#[test]
fn test_new_appends_sentinel() {
    let list = SubSampleList::new(&[SubSample::new(4, 16), SubSample::new(0, 8)])
        .expect("Failed to new(..)");

    assert_eq!(list.len(), 2);
    assert_eq!(list.as_bytes().len(), 3 * SUB_SAMPLE_RECORD_SIZE);
    assert_eq!(list.covered_bytes(), 28);
    assert_eq!(
        list.as_bytes(),
        encode(&[(4, 16), (0, 8), (SUB_SAMPLE_SENTINEL, 0)]).as_slice()
    );
}

#[test]
fn test_new_rejects_sentinel_clear_length() {
    let result = SubSampleList::new(&[SubSample::new(SUB_SAMPLE_SENTINEL, 1)]);

    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
}

#[test]
fn test_empty_list_is_only_the_sentinel() {
    let list = SubSampleList::new(&[]).expect("Failed to new(..)");

    assert!(list.is_empty());
    assert_eq!(list.covered_bytes(), 0);
    assert_eq!(list.iter().count(), 0);
}

// =============================================================================
// walk()
// =============================================================================

#[test]
fn test_walk_stops_at_sentinel() {
    let bytes = encode(&[(1, 2), (3, 4), (SUB_SAMPLE_SENTINEL, 0), (5, 6)]);
    let records: Vec<SubSample> = walk(&bytes).collect();

    assert_eq!(records, vec![SubSample::new(1, 2), SubSample::new(3, 4)]);
}

#[test]
fn test_walk_is_bounded_by_descriptor_size() {
    let mut bytes = encode(&[(1, 2), (3, 4)]);
    // Trailing partial record is never read.
    bytes.extend_from_slice(&[0xFF; 5]);

    let mut samples = walk(&bytes);
    let records: Vec<SubSample> = samples.by_ref().collect();

    assert_eq!(records.len(), 2);
    assert!(!samples.terminated());
}

#[test]
fn test_walk_of_empty_descriptor_yields_nothing() {
    assert_eq!(walk(&[]).count(), 0);
}

// =============================================================================
// from_descriptor()
// =============================================================================

#[test]
fn test_from_descriptor_keeps_records_before_sentinel() {
    let bytes = encode(&[(10, 20), (SUB_SAMPLE_SENTINEL, 0), (99, 99)]);
    let list = SubSampleList::from_descriptor(&bytes).expect("Failed to from_descriptor(..)");

    assert_eq!(list.len(), 1);
    assert_eq!(list.covered_bytes(), 30);
    assert_eq!(
        list.as_bytes(),
        encode(&[(10, 20), (SUB_SAMPLE_SENTINEL, 0)]).as_slice()
    );
}

#[test]
fn test_from_descriptor_requires_sentinel() {
    let bytes = encode(&[(10, 20)]);
    let result = SubSampleList::from_descriptor(&bytes);

    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
}
