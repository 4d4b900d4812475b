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

//! The operations shared by every counting filter.

use tracing::Level;
use tracing::trace;

use crate::Addr;
use crate::config::FilterConfig;

pub(crate) mod sealed {
    use crate::Addr;

    /// Saturating counter storage addressed by `Key`.
    pub trait CounterStorage {
        type Key: Copy;

        fn get(&self, key: Self::Key) -> u32;

        fn increment(&mut self, key: Self::Key);

        fn decrement(&mut self, key: Self::Key);

        fn clear(&mut self);

        fn total(&self) -> u64;

        /// Saturating element-wise add of `other` into `self`.
        fn merge(&mut self, other: &Self);
    }

    /// What a filter variant supplies: its storage and how an address maps
    /// to a storage key.
    pub trait FilterCore {
        type Storage: CounterStorage;

        fn filter_config(&self) -> &crate::config::FilterConfig;

        fn storage(&self) -> &Self::Storage;

        fn storage_mut(&mut self) -> &mut Self::Storage;

        fn slot(&self, addr: Addr) -> <Self::Storage as CounterStorage>::Key;
    }
}

use self::sealed::CounterStorage;
use self::sealed::FilterCore;

/// A counting filter over addresses.
///
/// Every slot holds a saturating counter. [`set`](Self::set) and
/// [`unset`](Self::unset) move the counter of the slot an address maps to;
/// [`is_set`](Self::is_set) compares that counter against the configured
/// threshold. How an address maps to a slot is what distinguishes the
/// implementations: [`AddressFoldingFilter`](crate::AddressFoldingFilter)
/// XOR-folds address bit-fields into a fixed table, while
/// [`OracleFilter`](crate::OracleFilter) gives every address its own counter.
///
/// The trait is sealed; the set of filters is closed.
pub trait CountingFilter: FilterCore {
    /// Returns the configuration the filter was built with.
    fn config(&self) -> &FilterConfig {
        self.filter_config()
    }

    /// Returns the number of counter slots.
    fn size(&self) -> usize {
        self.filter_config().size()
    }

    /// Returns the counter value at or above which an address reads as set.
    fn threshold(&self) -> u32 {
        self.filter_config().threshold()
    }

    /// Records a touch of `addr`, saturating at the counter ceiling.
    fn set(&mut self, addr: Addr) {
        let slot = self.slot(addr);
        self.storage_mut().increment(slot);
    }

    /// Removes a touch of `addr`, flooring at zero.
    ///
    /// Addresses that alias to the same slot share a counter, so unsetting
    /// one of them can make another, still present, address read as unset.
    fn unset(&mut self, addr: Addr) {
        let slot = self.slot(addr);
        self.storage_mut().decrement(slot);
    }

    /// Returns the counter of the slot `addr` maps to.
    fn get_count(&self, addr: Addr) -> u32 {
        self.storage().get(self.slot(addr))
    }

    /// Returns true if the counter of the slot `addr` maps to has reached
    /// the threshold.
    fn is_set(&self, addr: Addr) -> bool {
        self.get_count(addr) >= self.threshold()
    }

    /// Returns the sum of all counters.
    ///
    /// This counts accumulated touches, not set slots.
    fn total_count(&self) -> u64 {
        self.storage().total()
    }

    /// Returns true if every counter is zero.
    fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Resets every counter to zero.
    fn clear(&mut self) {
        trace!(total_count = self.total_count(), "clearing filter");
        self.storage_mut().clear();
    }

    /// Checks if `other` can be merged into this filter.
    fn is_compatible(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.filter_config().is_compatible(other.filter_config())
    }

    /// Adds the counters of `other` into this filter, saturating each slot
    /// at the counter ceiling. `other` is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different size, counter
    /// width, threshold, offset or masks). Use
    /// [`is_compatible()`](Self::is_compatible) to check first.
    fn merge(&mut self, other: &Self)
    where
        Self: Sized,
    {
        assert!(
            self.is_compatible(other),
            "cannot merge incompatible filters"
        );
        let before = tracing::enabled!(Level::TRACE).then(|| self.total_count());
        self.storage_mut().merge(other.storage());
        if let Some(before) = before {
            trace!(
                total_before = before,
                total_other = other.total_count(),
                total_after = self.total_count(),
                "merged filter"
            );
        }
    }
}
