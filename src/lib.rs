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

//! Counting filters for tracking which addresses were recently touched.
//!
//! A filter owns a fixed set of saturating counters. Every tracked event
//! calls [`CountingFilter::set`] with an address; queries ask whether the
//! counter the address maps to has reached a threshold. Filters can be
//! cleared at epoch boundaries and merged to combine per-partition state.
//!
//! Two filters are provided:
//!
//! - [`AddressFoldingFilter`]: a hardware-style counting Bloom filter that
//!   XOR-folds address bit-fields into a small table.
//! - [`OracleFilter`]: an exact, collision-free reference used to measure
//!   the error of the hashed filter.
//!
//! # Examples
//!
//! ```
//! use counting_filters::{AddressFoldingFilter, CountingFilter, FilterConfig, OracleFilter};
//!
//! let config = FilterConfig::builder()
//!     .size(16)
//!     .offset_bits(6)
//!     .counter_bits(2)
//!     .threshold(1)
//!     .mask(0, 4)
//!     .build()
//!     .unwrap();
//! let mut hashed = AddressFoldingFilter::new(config).unwrap();
//! let mut exact = OracleFilter::new(FilterConfig::builder().build().unwrap()).unwrap();
//!
//! for addr in [0x1000, 0x1040, 0x2000] {
//!     hashed.set(addr);
//!     exact.set(addr);
//! }
//!
//! // 0x3000 folds onto slot 0 like 0x1000 and 0x2000: a false positive.
//! assert!(hashed.is_set(0x3000));
//! assert!(!exact.is_set(0x3000));
//! ```

mod config;
mod counter;
mod filter;
mod folding;
mod oracle;
mod table;

pub mod error;

pub use self::config::FilterConfig;
pub use self::config::FilterConfigBuilder;
pub use self::config::Mask;
pub use self::counter::CounterWidth;
pub use self::counter::MAX_COUNTER_BITS;
pub use self::counter::MIN_COUNTER_BITS;
pub use self::filter::CountingFilter;
pub use self::folding::AddressFoldingFilter;
pub use self::oracle::OracleFilter;

/// A simulated physical or virtual address.
pub type Addr = u64;

/// Number of bits in an [`Addr`].
pub const ADDR_BITS: u32 = Addr::BITS;
