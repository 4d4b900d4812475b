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

//! Counter storage backing the filters.
//!
//! [`CounterTable`] is the dense table used by hashed filters: a fixed number
//! of slots addressed by index. [`SparseCounterTable`] is keyed by the full
//! address and only holds addresses whose counter is non-zero; it stands in
//! for an unbounded table in the collision-free oracle.

use std::collections::HashMap;

use crate::Addr;
use crate::counter::CounterWidth;
use crate::filter::sealed::CounterStorage;

/// A fixed-length sequence of saturating counters.
///
/// Public only as the storage type of the sealed filter trait; it is not
/// exported from the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTable {
    width: CounterWidth,
    counters: Vec<u32>,
}

impl CounterTable {
    pub(crate) fn new(len: usize, width: CounterWidth) -> Self {
        Self {
            width,
            counters: vec![0; len],
        }
    }

    /// Returns the counters in slot order.
    pub(crate) fn as_slice(&self) -> &[u32] {
        &self.counters
    }
}

impl CounterStorage for CounterTable {
    type Key = usize;

    fn get(&self, key: usize) -> u32 {
        self.counters[key]
    }

    fn increment(&mut self, key: usize) {
        let slot = &mut self.counters[key];
        *slot = self.width.increment(*slot);
    }

    fn decrement(&mut self, key: usize) {
        let slot = &mut self.counters[key];
        *slot = self.width.decrement(*slot);
    }

    fn clear(&mut self) {
        self.counters.fill(0);
    }

    fn total(&self) -> u64 {
        self.counters.iter().map(|&c| u64::from(c)).sum()
    }

    fn merge(&mut self, other: &Self) {
        assert_eq!(
            self.counters.len(),
            other.counters.len(),
            "cannot merge counter tables of different lengths"
        );
        for (slot, &theirs) in self.counters.iter_mut().zip(&other.counters) {
            *slot = self.width.add(*slot, theirs);
        }
    }
}

/// Saturating counters keyed by address.
///
/// Addresses that were never touched, or whose counter dropped back to zero,
/// are absent from the map and read as zero. Like [`CounterTable`], it is
/// not exported from the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseCounterTable {
    width: CounterWidth,
    counters: HashMap<Addr, u32>,
}

impl SparseCounterTable {
    pub(crate) fn new(width: CounterWidth) -> Self {
        Self {
            width,
            counters: HashMap::new(),
        }
    }

    /// Returns the number of addresses with a non-zero counter.
    pub(crate) fn len(&self) -> usize {
        self.counters.len()
    }

    /// Iterates over the tracked addresses and their counters, in no particular order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Addr, u32)> + '_ {
        self.counters.iter().map(|(&addr, &count)| (addr, count))
    }
}

impl CounterStorage for SparseCounterTable {
    type Key = Addr;

    fn get(&self, key: Addr) -> u32 {
        self.counters.get(&key).copied().unwrap_or(0)
    }

    fn increment(&mut self, key: Addr) {
        let width = self.width;
        let slot = self.counters.entry(key).or_insert(0);
        *slot = width.increment(*slot);
    }

    fn decrement(&mut self, key: Addr) {
        if let Some(slot) = self.counters.get_mut(&key) {
            *slot = self.width.decrement(*slot);
            if *slot == 0 {
                self.counters.remove(&key);
            }
        }
    }

    fn clear(&mut self) {
        self.counters.clear();
    }

    fn total(&self) -> u64 {
        self.counters.values().map(|&c| u64::from(c)).sum()
    }

    fn merge(&mut self, other: &Self) {
        let width = self.width;
        for (&addr, &theirs) in &other.counters {
            let slot = self.counters.entry(addr).or_insert(0);
            *slot = width.add(*slot, theirs);
        }
    }
}
