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

use crate::ADDR_BITS;
use crate::counter::CounterWidth;
use crate::error::Error;

const DEFAULT_SIZE: usize = 1;
const DEFAULT_OFFSET_BITS: u32 = 0;
const DEFAULT_COUNTER_BITS: u32 = 1;
const DEFAULT_THRESHOLD: u32 = 1;

/// A bit-field of an address, `width` bits starting at bit `lsb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask {
    lsb: u32,
    width: u32,
}

impl Mask {
    /// Creates a mask descriptor. Range checks happen when a filter is built.
    pub fn new(lsb: u32, width: u32) -> Self {
        Self { lsb, width }
    }

    /// Returns the least significant bit of the field.
    pub fn lsb(&self) -> u32 {
        self.lsb
    }

    /// Returns the number of bits in the field.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Extracts the field from `value`, right-aligned at bit 0.
    #[inline]
    pub fn extract(&self, value: u64) -> u64 {
        let field_mask = if self.width >= u64::BITS {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        };
        value.checked_shr(self.lsb).unwrap_or(0) & field_mask
    }

    /// Bit position one past the most significant bit of the field.
    pub(crate) fn end(&self) -> u64 {
        u64::from(self.lsb) + u64::from(self.width)
    }
}

/// Validated, immutable configuration of a filter.
///
/// Use [`FilterConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterConfig {
    size: usize,
    offset_bits: u32,
    counter_width: CounterWidth,
    threshold: u32,
    masks: Vec<Mask>,
}

impl FilterConfig {
    /// Returns a builder initialized with the defaults: one slot, no offset,
    /// one-bit counters, threshold one and no masks.
    ///
    /// # Examples
    ///
    /// ```
    /// use counting_filters::FilterConfig;
    ///
    /// let config = FilterConfig::builder()
    ///     .size(16)
    ///     .offset_bits(6)
    ///     .counter_bits(2)
    ///     .threshold(2)
    ///     .masks_lsbs([0])
    ///     .masks_sizes([4])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.ceiling(), 3);
    /// ```
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    /// Returns the number of counter slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of low-order address bits discarded before hashing.
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Returns the counter width.
    pub fn counter_width(&self) -> CounterWidth {
        self.counter_width
    }

    /// Returns the number of bits per counter.
    pub fn counter_bits(&self) -> u32 {
        self.counter_width.bits()
    }

    /// Returns the largest value a counter can hold.
    pub fn ceiling(&self) -> u32 {
        self.counter_width.ceiling()
    }

    /// Returns the counter value at or above which a slot reads as set.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns the address-folding masks, in the order they were given.
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Checks if filters built from the two configurations may be merged.
    ///
    /// Only identical configurations are compatible: equal size alone is not
    /// enough, since merging filters that disagree on counter width,
    /// threshold or hashing would mix incomparable counts.
    pub fn is_compatible(&self, other: &FilterConfig) -> bool {
        self == other
    }
}

/// Builder for [`FilterConfig`].
///
/// Masks are given as two parallel lists, one of LSBs and one of widths, the
/// way hardware parameter files describe them. The lists must have the same
/// length.
#[derive(Debug, Clone)]
pub struct FilterConfigBuilder {
    size: usize,
    offset_bits: u32,
    counter_bits: u32,
    threshold: u32,
    masks_lsbs: Vec<u32>,
    masks_sizes: Vec<u32>,
}

impl Default for FilterConfigBuilder {
    fn default() -> Self {
        FilterConfigBuilder {
            size: DEFAULT_SIZE,
            offset_bits: DEFAULT_OFFSET_BITS,
            counter_bits: DEFAULT_COUNTER_BITS,
            threshold: DEFAULT_THRESHOLD,
            masks_lsbs: vec![],
            masks_sizes: vec![],
        }
    }
}

impl FilterConfigBuilder {
    /// Sets the number of counter slots.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the number of low-order address bits discarded before hashing.
    pub fn offset_bits(mut self, offset_bits: u32) -> Self {
        self.offset_bits = offset_bits;
        self
    }

    /// Sets the number of bits per counter.
    pub fn counter_bits(mut self, counter_bits: u32) -> Self {
        self.counter_bits = counter_bits;
        self
    }

    /// Sets the counter value at or above which a slot reads as set.
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the list of mask LSBs.
    pub fn masks_lsbs(mut self, lsbs: impl IntoIterator<Item = u32>) -> Self {
        self.masks_lsbs = lsbs.into_iter().collect();
        self
    }

    /// Replaces the list of mask widths.
    pub fn masks_sizes(mut self, sizes: impl IntoIterator<Item = u32>) -> Self {
        self.masks_sizes = sizes.into_iter().collect();
        self
    }

    /// Appends one complete mask.
    pub fn mask(mut self, lsb: u32, width: u32) -> Self {
        self.masks_lsbs.push(lsb);
        self.masks_sizes.push(width);
        self
    }

    /// Validates the parameters shared by every filter and builds the config.
    ///
    /// Variant-specific checks (mask ranges, oracle parameters) are done by
    /// the filter constructors.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// - `size` is zero,
    /// - `offset_bits` is not smaller than the address width,
    /// - `counter_bits` is outside `[1, 32]`,
    /// - `threshold` is zero or above the counter ceiling,
    /// - the mask LSB and width lists differ in length.
    pub fn build(self) -> Result<FilterConfig, Error> {
        if self.size == 0 {
            return Err(Error::config_invalid("filter size must be at least 1"));
        }
        if self.offset_bits >= ADDR_BITS {
            return Err(
                Error::config_invalid("offset bits must be smaller than the address width")
                    .with_context("offset_bits", self.offset_bits)
                    .with_context("address_bits", ADDR_BITS),
            );
        }

        let counter_width = CounterWidth::new(self.counter_bits)?;
        if self.threshold == 0 || self.threshold > counter_width.ceiling() {
            return Err(Error::config_invalid(format!(
                "threshold must be in [1, {}]",
                counter_width.ceiling()
            ))
            .with_context("threshold", self.threshold)
            .with_context("counter_bits", self.counter_bits));
        }

        if self.masks_lsbs.len() != self.masks_sizes.len() {
            return Err(Error::config_invalid(
                "incomplete mask: every mask needs both an LSB and a size",
            )
            .with_context("masks_lsbs", self.masks_lsbs.len())
            .with_context("masks_sizes", self.masks_sizes.len()));
        }

        let masks = self
            .masks_lsbs
            .iter()
            .zip(&self.masks_sizes)
            .map(|(&lsb, &width)| Mask::new(lsb, width))
            .collect();

        Ok(FilterConfig {
            size: self.size,
            offset_bits: self.offset_bits,
            counter_width,
            threshold: self.threshold,
            masks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::builder().build().unwrap();
        assert_eq!(config.size(), 1);
        assert_eq!(config.offset_bits(), 0);
        assert_eq!(config.counter_bits(), 1);
        assert_eq!(config.ceiling(), 1);
        assert_eq!(config.threshold(), 1);
        assert!(config.masks().is_empty());
    }

    #[test]
    fn test_masks_from_parallel_lists_and_single_mask() {
        let parallel = FilterConfig::builder()
            .size(16)
            .masks_lsbs([1, 3])
            .masks_sizes([1, 1])
            .build()
            .unwrap();
        let chained = FilterConfig::builder()
            .size(16)
            .mask(1, 1)
            .mask(3, 1)
            .build()
            .unwrap();
        assert_eq!(parallel, chained);
        assert_eq!(parallel.masks(), &[Mask::new(1, 1), Mask::new(3, 1)]);
    }

    #[test]
    fn test_rejects_zero_size() {
        let err = FilterConfig::builder().size(0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_rejects_offset_past_address() {
        assert!(FilterConfig::builder().offset_bits(63).build().is_ok());
        let err = FilterConfig::builder().offset_bits(64).build().unwrap_err();
        assert_eq!(err.context_value("offset_bits"), Some("64"));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(FilterConfig::builder().threshold(0).build().is_err());
        assert!(
            FilterConfig::builder()
                .counter_bits(2)
                .threshold(4)
                .build()
                .is_err()
        );
        assert!(
            FilterConfig::builder()
                .counter_bits(2)
                .threshold(3)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_rejects_incomplete_mask() {
        let err = FilterConfig::builder()
            .masks_lsbs([0, 10])
            .masks_sizes([5])
            .build()
            .unwrap_err();
        assert!(err.message().contains("incomplete mask"));
        assert_eq!(err.context_value("masks_lsbs"), Some("2"));
        assert_eq!(err.context_value("masks_sizes"), Some("1"));
    }

    #[test]
    fn test_compatibility_requires_full_equality() {
        let base = FilterConfig::builder().size(8).counter_bits(2).build().unwrap();
        let same = FilterConfig::builder().size(8).counter_bits(2).build().unwrap();
        let other_threshold = FilterConfig::builder()
            .size(8)
            .counter_bits(2)
            .threshold(2)
            .build()
            .unwrap();
        let other_size = FilterConfig::builder().size(9).counter_bits(2).build().unwrap();
        assert!(base.is_compatible(&same));
        assert!(!base.is_compatible(&other_threshold));
        assert!(!base.is_compatible(&other_size));
    }

    #[test]
    fn test_mask_extract() {
        assert_eq!(Mask::new(1, 1).extract(2), 1);
        assert_eq!(Mask::new(3, 1).extract(2), 0);
        assert_eq!(Mask::new(0, 4).extract(0xAB), 0xB);
        assert_eq!(Mask::new(4, 4).extract(0xAB), 0xA);
        assert_eq!(Mask::new(0, 0).extract(u64::MAX), 0);
        assert_eq!(Mask::new(0, 64).extract(u64::MAX), u64::MAX);
        assert_eq!(Mask::new(64, 1).extract(u64::MAX), 0);
    }
}
