// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Sub-sample descriptors.
//!
//! A descriptor is a contiguous array of `(u32 clear_bytes, u32 encrypted_bytes)`
//! records in native byte order, terminated by a record whose `clear_bytes` is
//! [`SUB_SAMPLE_SENTINEL`]. Walks are always bounded by the descriptor size, so a
//! missing sentinel ends the walk at the last whole record.

use core::slice::ChunksExact;

use crate::error::CryptoError;

/// `clear_bytes` value marking the end of a descriptor.
pub const SUB_SAMPLE_SENTINEL: u32 = 0xFFFF_FFFF;

/// Encoded size of one record.
pub const SUB_SAMPLE_RECORD_SIZE: usize = 8;

/// One `(clear, encrypted)` segment of a media sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct SubSample {
    /// Bytes copied verbatim.
    pub clear_bytes: u32,
    /// Bytes deciphered after the clear run.
    pub encrypted_bytes: u32,
}

impl SubSample {
    /// Creates a record.
    #[inline]
    pub const fn new(clear_bytes: u32, encrypted_bytes: u32) -> Self {
        Self {
            clear_bytes,
            encrypted_bytes,
        }
    }

    /// The terminating record.
    #[inline]
    pub const fn sentinel() -> Self {
        Self::new(SUB_SAMPLE_SENTINEL, 0)
    }

    /// Returns true for the terminating record.
    #[inline]
    pub const fn is_sentinel(&self) -> bool {
        self.clear_bytes == SUB_SAMPLE_SENTINEL
    }

    /// Bytes covered by this record.
    #[inline]
    pub const fn covered_bytes(&self) -> u64 {
        self.clear_bytes as u64 + self.encrypted_bytes as u64
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.clear_bytes.to_ne_bytes());
        out.extend_from_slice(&self.encrypted_bytes.to_ne_bytes());
    }

    fn decode(record: &[u8]) -> Option<Self> {
        let (clear, rest) = record.split_first_chunk::<4>()?;
        let encrypted = rest.first_chunk::<4>()?;

        Some(Self::new(
            u32::from_ne_bytes(*clear),
            u32::from_ne_bytes(*encrypted),
        ))
    }
}

/// Iterator over the records of a descriptor, stopping at the sentinel.
pub struct SubSampleWalk<'a> {
    records: ChunksExact<'a, u8>,
    terminated: bool,
}

impl SubSampleWalk<'_> {
    /// Returns true once the walk has consumed the sentinel.
    pub fn terminated(&self) -> bool {
        self.terminated
    }
}

impl Iterator for SubSampleWalk<'_> {
    type Item = SubSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.terminated {
            return None;
        }

        let sample = SubSample::decode(self.records.next()?)?;
        if sample.is_sentinel() {
            self.terminated = true;
            return None;
        }

        Some(sample)
    }
}

/// Walks the records of an encoded descriptor, bounded by its length.
pub fn walk(descriptor: &[u8]) -> SubSampleWalk<'_> {
    SubSampleWalk {
        records: descriptor.chunks_exact(SUB_SAMPLE_RECORD_SIZE),
        terminated: false,
    }
}

/// An encoded, sentinel-terminated sub-sample descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSampleList {
    descriptor: Vec<u8>,
    records: usize,
    covered: u64,
}

impl SubSampleList {
    /// Encodes `samples` and appends the sentinel.
    ///
    /// Fails if a record uses the sentinel value as its clear length.
    pub fn new(samples: &[SubSample]) -> Result<Self, CryptoError> {
        if samples.iter().any(SubSample::is_sentinel) {
            return Err(CryptoError::InvalidArgument(
                "sub-sample clear length collides with the sentinel",
            ));
        }

        let mut descriptor = Vec::with_capacity((samples.len() + 1) * SUB_SAMPLE_RECORD_SIZE);
        for sample in samples {
            sample.encode_into(&mut descriptor);
        }
        SubSample::sentinel().encode_into(&mut descriptor);

        Ok(Self {
            descriptor,
            records: samples.len(),
            covered: samples.iter().map(SubSample::covered_bytes).sum(),
        })
    }

    /// Parses a raw descriptor of `descriptor.len()` bytes.
    ///
    /// Keeps the records up to and including the sentinel. Fails if no sentinel
    /// appears within the given size.
    pub fn from_descriptor(descriptor: &[u8]) -> Result<Self, CryptoError> {
        let mut samples = walk(descriptor);
        let collected: Vec<SubSample> = samples.by_ref().collect();

        if !samples.terminated() {
            return Err(CryptoError::InvalidArgument(
                "sub-sample descriptor has no sentinel within its size",
            ));
        }

        Self::new(&collected)
    }

    /// Encoded bytes, sentinel included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.descriptor
    }

    /// Number of records, sentinel excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.records
    }

    /// Returns true if the list holds only the sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Sum of clear and encrypted bytes over all records.
    #[inline]
    pub fn covered_bytes(&self) -> u64 {
        self.covered
    }

    /// Walks the records in order.
    pub fn iter(&self) -> SubSampleWalk<'_> {
        walk(&self.descriptor)
    }
}
