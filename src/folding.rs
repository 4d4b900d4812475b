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

use tracing::debug;

use crate::ADDR_BITS;
use crate::Addr;
use crate::config::FilterConfig;
use crate::config::Mask;
use crate::error::Error;
use crate::filter::CountingFilter;
use crate::filter::sealed::FilterCore;
use crate::table::CounterTable;

/// A counting Bloom filter indexed by XOR-folding address bit-fields.
///
/// The index of an address is computed the way hardware indexes small
/// tables: the block offset is dropped, each configured [`Mask`] extracts a
/// bit-field from what remains, and the fields are XORed together. Distinct
/// addresses whose folded fields coincide share a counter, which is where
/// false positives come from.
///
/// # Examples
///
/// ```
/// use counting_filters::{AddressFoldingFilter, CountingFilter, FilterConfig};
///
/// let config = FilterConfig::builder()
///     .size(16)
///     .offset_bits(6)
///     .masks_lsbs([0])
///     .masks_sizes([4])
///     .build()
///     .unwrap();
/// let mut filter = AddressFoldingFilter::new(config).unwrap();
///
/// filter.set(0x40);
/// assert!(filter.is_set(0x40));
/// assert!(filter.is_set(0x41)); // same 64-byte block
/// assert!(!filter.is_set(0x80));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFoldingFilter {
    config: FilterConfig,
    table: CounterTable,
}

impl AddressFoldingFilter {
    /// Creates an empty filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// - no mask is configured,
    /// - a mask reaches past the most significant address bit,
    /// - a mask is wider than `floor(log2(size))` bits, which could produce
    ///   an index outside the table.
    ///
    /// Masks narrower than the table are accepted; they just leave some
    /// slots unreachable.
    pub fn new(config: FilterConfig) -> Result<Self, Error> {
        validate_masks(&config)?;

        debug!(
            size = config.size(),
            offset_bits = config.offset_bits(),
            counter_bits = config.counter_bits(),
            threshold = config.threshold(),
            num_masks = config.masks().len(),
            "created address folding filter"
        );

        let table = CounterTable::new(config.size(), config.counter_width());
        Ok(Self { config, table })
    }

    /// Returns the table slot `addr` maps to.
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_filters::{AddressFoldingFilter, FilterConfig};
    ///
    /// let config = FilterConfig::builder()
    ///     .size(16)
    ///     .mask(1, 1)
    ///     .mask(3, 1)
    ///     .build()
    ///     .unwrap();
    /// let filter = AddressFoldingFilter::new(config).unwrap();
    /// assert_eq!(filter.index(2), 1);
    /// assert_eq!(filter.index(3), 1);
    /// assert_eq!(filter.index(10), 0);
    /// ```
    pub fn index(&self, addr: Addr) -> usize {
        let shifted = addr >> self.config.offset_bits();
        let folded = self
            .config
            .masks()
            .iter()
            .fold(0u64, |acc, mask| acc ^ mask.extract(shifted));
        // every mask is at most floor(log2(size)) bits wide
        debug_assert!(folded < self.config.size() as u64);
        folded as usize
    }

    /// Returns the address-folding masks.
    pub fn masks(&self) -> &[Mask] {
        self.config.masks()
    }

    /// Returns the counters in slot order.
    pub fn counters(&self) -> &[u32] {
        self.table.as_slice()
    }
}

impl FilterCore for AddressFoldingFilter {
    type Storage = CounterTable;

    fn filter_config(&self) -> &FilterConfig {
        &self.config
    }

    fn storage(&self) -> &CounterTable {
        &self.table
    }

    fn storage_mut(&mut self) -> &mut CounterTable {
        &mut self.table
    }

    fn slot(&self, addr: Addr) -> usize {
        self.index(addr)
    }
}

impl CountingFilter for AddressFoldingFilter {}

/// Largest mask width whose fields all fit in a table of `size` slots.
fn max_mask_width(size: usize) -> u32 {
    size.ilog2()
}

fn validate_masks(config: &FilterConfig) -> Result<(), Error> {
    if config.masks().is_empty() {
        return Err(Error::config_invalid(
            "address folding filter needs at least one mask",
        ));
    }

    let max_width = max_mask_width(config.size());
    for (i, mask) in config.masks().iter().enumerate() {
        if mask.end() > u64::from(ADDR_BITS) {
            return Err(Error::config_invalid("mask LSB out of range")
                .with_context("mask", i)
                .with_context("lsb", mask.lsb())
                .with_context("width", mask.width())
                .with_context("address_bits", ADDR_BITS));
        }
        if mask.width() == 0 && config.size() > 1 {
            return Err(Error::config_invalid("zero-width mask")
                .with_context("mask", i)
                .with_context("size", config.size()));
        }
        if mask.width() > max_width {
            return Err(Error::config_invalid("mask too large for filter size")
                .with_context("mask", i)
                .with_context("width", mask.width())
                .with_context("size", config.size())
                .with_context("max_width", max_width));
        }
    }
    Ok(())
}
