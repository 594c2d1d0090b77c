// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Parameter slots.

use core::fmt;

use crate::error::CryptoError;
use crate::region::{MemFlags, SharedRegion};

/// Client-side slot type, as packed into the operation type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParamType {
    /// Unused slot.
    None = 0x0,
    /// Value pair, host to TEE.
    ValueInput = 0x1,
    /// Value pair, TEE to host.
    ValueOutput = 0x2,
    /// Value pair, both directions.
    ValueInout = 0x3,
    /// Temporary host buffer, host to TEE.
    MemrefTempInput = 0x5,
    /// Temporary host buffer, TEE to host.
    MemrefTempOutput = 0x6,
    /// Temporary host buffer, both directions.
    MemrefTempInout = 0x7,
    /// Whole shared region.
    MemrefWhole = 0xC,
    /// Window of a shared region, host to TEE.
    MemrefPartialInput = 0xD,
    /// Window of a shared region, TEE to host.
    MemrefPartialOutput = 0xE,
    /// Window of a shared region, both directions.
    MemrefPartialInout = 0xF,
}

impl ParamType {
    /// Returns the 4-bit code.
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decodes a 4-bit code.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        Some(match bits {
            0x0 => ParamType::None,
            0x1 => ParamType::ValueInput,
            0x2 => ParamType::ValueOutput,
            0x3 => ParamType::ValueInout,
            0x5 => ParamType::MemrefTempInput,
            0x6 => ParamType::MemrefTempOutput,
            0x7 => ParamType::MemrefTempInout,
            0xC => ParamType::MemrefWhole,
            0xD => ParamType::MemrefPartialInput,
            0xE => ParamType::MemrefPartialOutput,
            0xF => ParamType::MemrefPartialInout,
            _ => return None,
        })
    }
}

/// Slot type as seen by the trusted application after client translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TaParamType {
    /// Unused slot.
    None = 0,
    /// Value pair, host to TEE.
    ValueInput = 1,
    /// Value pair, TEE to host.
    ValueOutput = 2,
    /// Value pair, both directions.
    ValueInout = 3,
    /// Memory reference, host to TEE.
    MemrefInput = 5,
    /// Memory reference, TEE to host.
    MemrefOutput = 6,
    /// Memory reference, both directions.
    MemrefInout = 7,
}

impl TaParamType {
    /// Returns the 4-bit code.
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    fn from_flags(flags: MemFlags) -> Self {
        if flags.contains(MemFlags::INOUT) {
            TaParamType::MemrefInout
        } else if flags.contains(MemFlags::OUTPUT) {
            TaParamType::MemrefOutput
        } else {
            TaParamType::MemrefInput
        }
    }
}

/// One parameter slot of an [`Operation`](crate::Operation).
pub enum Param<'a> {
    /// Unused slot.
    None,
    /// Host scratch read by the TEE.
    TmpInput(&'a [u8]),
    /// Host scratch written by the TEE.
    TmpOutput(&'a mut [u8]),
    /// A whole shared region.
    Whole(&'a SharedRegion<'a>),
    /// A window of a shared region read by the TEE.
    PartialInput {
        /// Parent region.
        region: &'a SharedRegion<'a>,
        /// Window start within the region.
        offset: usize,
        /// Window length.
        size: usize,
    },
    /// A window of a shared region written by the TEE.
    PartialOutput {
        /// Parent region.
        region: &'a SharedRegion<'a>,
        /// Window start within the region.
        offset: usize,
        /// Window length.
        size: usize,
    },
}

impl<'a> Param<'a> {
    /// Temporary input over `buffer`.
    #[inline]
    pub fn tmp_input(buffer: &'a [u8]) -> Self {
        Param::TmpInput(buffer)
    }

    /// Temporary output over `buffer`.
    #[inline]
    pub fn tmp_output(buffer: &'a mut [u8]) -> Self {
        Param::TmpOutput(buffer)
    }

    /// Whole-region reference.
    #[inline]
    pub fn whole(region: &'a SharedRegion<'a>) -> Self {
        Param::Whole(region)
    }

    /// Input window `[offset, offset + size)` of `region`.
    ///
    /// Fails if the region is not input-capable or the window exceeds it.
    pub fn partial_input(
        region: &'a SharedRegion<'a>,
        offset: usize,
        size: usize,
    ) -> Result<Self, CryptoError> {
        if !region.flags().contains(MemFlags::INPUT) {
            return Err(CryptoError::InvalidArgument(
                "partial input over a region without input direction",
            ));
        }
        if !region.contains_window(offset, size) {
            return Err(CryptoError::InvalidArgument(
                "partial input window exceeds its region",
            ));
        }

        Ok(Param::PartialInput {
            region,
            offset,
            size,
        })
    }

    /// Output window `[offset, offset + size)` of `region`.
    ///
    /// Fails if the region is not output-capable or the window exceeds it.
    pub fn partial_output(
        region: &'a SharedRegion<'a>,
        offset: usize,
        size: usize,
    ) -> Result<Self, CryptoError> {
        if !region.flags().contains(MemFlags::OUTPUT) {
            return Err(CryptoError::InvalidArgument(
                "partial output over a region without output direction",
            ));
        }
        if !region.contains_window(offset, size) {
            return Err(CryptoError::InvalidArgument(
                "partial output window exceeds its region",
            ));
        }

        Ok(Param::PartialOutput {
            region,
            offset,
            size,
        })
    }

    /// Client-side slot type.
    pub fn param_type(&self) -> ParamType {
        match self {
            Param::None => ParamType::None,
            Param::TmpInput(_) => ParamType::MemrefTempInput,
            Param::TmpOutput(_) => ParamType::MemrefTempOutput,
            Param::Whole(_) => ParamType::MemrefWhole,
            Param::PartialInput { .. } => ParamType::MemrefPartialInput,
            Param::PartialOutput { .. } => ParamType::MemrefPartialOutput,
        }
    }

    /// Slot type after translation for the trusted application.
    ///
    /// Whole-region references translate by the region's direction flags.
    pub fn ta_param_type(&self) -> TaParamType {
        match self {
            Param::None => TaParamType::None,
            Param::TmpInput(_) | Param::PartialInput { .. } => TaParamType::MemrefInput,
            Param::TmpOutput(_) | Param::PartialOutput { .. } => TaParamType::MemrefOutput,
            Param::Whole(region) => TaParamType::from_flags(region.flags()),
        }
    }

    /// Length of the memory the slot exposes.
    pub fn size(&self) -> usize {
        match self {
            Param::None => 0,
            Param::TmpInput(buffer) => buffer.len(),
            Param::TmpOutput(buffer) => buffer.len(),
            Param::Whole(region) => region.size(),
            Param::PartialInput { size, .. } | Param::PartialOutput { size, .. } => *size,
        }
    }

    /// Parent region, for region-backed slots.
    pub fn region(&self) -> Option<&'a SharedRegion<'a>> {
        match self {
            Param::Whole(region)
            | Param::PartialInput { region, .. }
            | Param::PartialOutput { region, .. } => Some(*region),
            _ => None,
        }
    }

    /// Window offset within the parent region (zero for whole references).
    pub fn offset(&self) -> usize {
        match self {
            Param::PartialInput { offset, .. } | Param::PartialOutput { offset, .. } => *offset,
            _ => 0,
        }
    }
}

impl fmt::Debug for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Param");
        debug
            .field("type", &self.param_type())
            .field("size", &self.size());

        if let Some(region) = self.region() {
            debug
                .field("shm", &region.id().get())
                .field("offset", &self.offset());
        }

        debug.finish()
    }
}
