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

use crate::Addr;
use crate::config::FilterConfig;
use crate::error::Error;
use crate::filter::CountingFilter;
use crate::filter::sealed::FilterCore;
use crate::table::SparseCounterTable;

/// A collision-free filter that tracks every address exactly.
///
/// Each address owns a one-bit counter, so there are no false positives and
/// no false negatives. It is the baseline against which hashed filters are
/// measured. The full address is the key; the configured offset bits are
/// not discarded.
///
/// `offset_bits` still takes part in [`CountingFilter::is_compatible`], so
/// two oracles that differ only in offset cannot be merged even though they
/// index addresses the same way.
///
/// # Examples
///
/// ```
/// use counting_filters::{CountingFilter, FilterConfig, OracleFilter};
///
/// let mut filter = OracleFilter::new(FilterConfig::builder().build().unwrap()).unwrap();
/// filter.set(0);
/// filter.set(0);
/// assert_eq!(filter.get_count(0), 1);
/// assert!(!filter.is_set(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleFilter {
    config: FilterConfig,
    table: SparseCounterTable,
}

impl OracleFilter {
    /// Creates an empty oracle.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid)
    /// unless `size` and `counter_bits` are 1. A threshold other than 1 cannot
    /// get past [`FilterConfigBuilder::build`](crate::FilterConfigBuilder::build)
    /// with 1-bit counters.
    pub fn new(config: FilterConfig) -> Result<Self, Error> {
        if config.size() != 1 {
            return Err(Error::config_invalid("oracle filter size must be 1")
                .with_context("size", config.size()));
        }
        if config.counter_bits() != 1 {
            return Err(Error::config_invalid("oracle filter counters must be 1 bit")
                .with_context("counter_bits", config.counter_bits()));
        }
        // The builder caps the threshold at the 1-bit ceiling.
        debug!(offset_bits = config.offset_bits(), "created oracle filter");

        let table = SparseCounterTable::new(config.counter_width());
        Ok(Self { config, table })
    }

    /// Returns the number of distinct addresses currently present.
    pub fn tracked_addresses(&self) -> usize {
        self.table.len()
    }

    /// Iterates over the addresses currently present, in no particular order.
    pub fn addresses(&self) -> impl Iterator<Item = Addr> + '_ {
        self.table.iter().map(|(addr, _)| addr)
    }
}

impl FilterCore for OracleFilter {
    type Storage = SparseCounterTable;

    fn filter_config(&self) -> &FilterConfig {
        &self.config
    }

    fn storage(&self) -> &SparseCounterTable {
        &self.table
    }

    fn storage_mut(&mut self) -> &mut SparseCounterTable {
        &mut self.table
    }

    fn slot(&self, addr: Addr) -> Addr {
        addr
    }
}

impl CountingFilter for OracleFilter {}
