// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Four-slot operation and its packed type word.

use core::fmt;

use crate::consts::NUM_PARAMS;
use crate::param::{Param, ParamType, TaParamType};

/// Packs four client slot types into one type word (slot `i` in bits `[4i, 4i + 4)`).
pub const fn param_types(t0: ParamType, t1: ParamType, t2: ParamType, t3: ParamType) -> u32 {
    t0.bits() | (t1.bits() << 4) | (t2.bits() << 8) | (t3.bits() << 12)
}

/// Packs four TA-side slot types into one type word.
pub const fn ta_param_types(
    t0: TaParamType,
    t1: TaParamType,
    t2: TaParamType,
    t3: TaParamType,
) -> u32 {
    t0.bits() | (t1.bits() << 4) | (t2.bits() << 8) | (t3.bits() << 12)
}

/// Extracts the 4-bit code of slot `index` from a type word.
#[inline]
pub const fn param_type_at(word: u32, index: usize) -> u32 {
    (word >> (index * 4)) & 0xF
}

/// Parameters of one remote command.
pub struct Operation<'a> {
    params: [Param<'a>; NUM_PARAMS],
    updated_sizes: [Option<usize>; NUM_PARAMS],
}

impl<'a> Operation<'a> {
    /// Creates an operation from its four slots.
    pub fn new(p0: Param<'a>, p1: Param<'a>, p2: Param<'a>, p3: Param<'a>) -> Self {
        Self {
            params: [p0, p1, p2, p3],
            updated_sizes: [None; NUM_PARAMS],
        }
    }

    /// Creates an operation with every slot unused.
    pub fn empty() -> Self {
        Self::new(Param::None, Param::None, Param::None, Param::None)
    }

    /// Client-side type word.
    pub fn param_types(&self) -> u32 {
        let [p0, p1, p2, p3] = &self.params;
        param_types(
            p0.param_type(),
            p1.param_type(),
            p2.param_type(),
            p3.param_type(),
        )
    }

    /// Type word as the trusted application receives it.
    pub fn ta_param_types(&self) -> u32 {
        let [p0, p1, p2, p3] = &self.params;
        ta_param_types(
            p0.ta_param_type(),
            p1.ta_param_type(),
            p2.ta_param_type(),
            p3.ta_param_type(),
        )
    }

    /// Slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_PARAMS`.
    #[inline]
    pub fn param(&self, index: usize) -> &Param<'a> {
        &self.params[index]
    }

    /// Puts `param` in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_PARAMS`.
    pub fn set(&mut self, index: usize, param: Param<'a>) -> &mut Self {
        self.params[index] = param;
        self
    }

    /// Mutable slot `index`, for transports writing output.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_PARAMS`.
    #[inline]
    pub fn param_mut(&mut self, index: usize) -> &mut Param<'a> {
        &mut self.params[index]
    }

    /// Records the size the remote side reported for slot `index`.
    pub fn set_updated_size(&mut self, index: usize, size: usize) {
        if let Some(slot) = self.updated_sizes.get_mut(index) {
            *slot = Some(size);
        }
    }

    /// Size the remote side reported for slot `index`, if any.
    pub fn updated_size(&self, index: usize) -> Option<usize> {
        self.updated_sizes.get(index).copied().flatten()
    }
}

impl fmt::Debug for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("param_types", &format_args!("{:#06x}", self.param_types()))
            .field("params", &self.params)
            .finish()
    }
}
