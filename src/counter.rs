// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Saturating counter arithmetic.

use crate::error::Error;

/// Narrowest counter a filter may use.
pub const MIN_COUNTER_BITS: u32 = 1;
/// Widest counter a filter may use; counters are stored as `u32`.
pub const MAX_COUNTER_BITS: u32 = 32;

/// Bit width of a saturating counter.
///
/// A counter of width `w` holds values in `[0, 2^w - 1]`. Increments and
/// merges clamp at the ceiling; decrements clamp at zero. Nothing wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterWidth {
    bits: u32,
    ceiling: u32,
}

impl CounterWidth {
    /// Creates a counter width of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// if `bits` is outside `[1, 32]`.
    pub fn new(bits: u32) -> Result<Self, Error> {
        if !(MIN_COUNTER_BITS..=MAX_COUNTER_BITS).contains(&bits) {
            return Err(Error::config_invalid(format!(
                "counter bits must be in [{MIN_COUNTER_BITS}, {MAX_COUNTER_BITS}]"
            ))
            .with_context("counter_bits", bits));
        }
        let ceiling = if bits == u32::BITS {
            u32::MAX
        } else {
            (1u32 << bits) - 1
        };
        Ok(Self { bits, ceiling })
    }

    /// Returns the number of bits per counter.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns the saturation ceiling, `2^bits - 1`.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    #[inline]
    pub(crate) fn increment(&self, value: u32) -> u32 {
        self.add(value, 1)
    }

    #[inline]
    pub(crate) fn decrement(&self, value: u32) -> u32 {
        value.saturating_sub(1)
    }

    /// `min(a + b, ceiling)`, computed without overflow.
    #[inline]
    pub(crate) fn add(&self, a: u32, b: u32) -> u32 {
        a.saturating_add(b).min(self.ceiling)
    }
}
