//! Copyright © 2025-2026 The Rowflow Authors. All Rights Reserved.
//!
//! This file is part of Rowflow.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Rowflow Chunk Sizing Module
//!
//! Decides the batch size for one export: static heuristics up front (an
//! explicit request always wins, otherwise query-shape classification plus
//! a packaged-format bias), then a runtime feedback loop that halves the
//! size under memory pressure. The size is stable within a chunk and only
//! ever shrinks across chunks; it never grows back mid-export.

use crate::config::RfExportConfig;
use crate::errors::{Result, RfError};
use crate::source::RfQueryShape;

/// Capability probe for process memory usage. Kept as a trait so tests can
/// inject readings and non-Linux hosts can degrade to no feedback.
pub trait RfMemoryProbe {
    /// Current resident set size in bytes, when the platform can report it.
    fn resident_bytes(&self) -> Option<u64>;
}

/// Default probe reading `/proc/self/statm`. Assumes 4 KiB pages.
pub struct RfProcMemoryProbe;

impl RfMemoryProbe for RfProcMemoryProbe {
    fn resident_bytes(&self) -> Option<u64> {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let rss_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
        Some(rss_pages * 4096)
    }
}

/// Fixed-reading probe, useful for tests and for disabling feedback.
pub struct RfFixedMemoryProbe(pub Option<u64>);

impl RfMemoryProbe for RfFixedMemoryProbe {
    fn resident_bytes(&self) -> Option<u64> {
        self.0
    }
}

/// Per-export chunk-size state.
#[derive(Debug)]
pub struct RfChunkSizer {
    current: usize,
    floor: usize,
    memory_limit_bytes: u64,
    memory_warn_fraction: f64,
}

impl RfChunkSizer {
    /// Resolves the initial chunk size for one export.
    ///
    /// An explicit caller-requested size always wins (zero is rejected).
    /// Otherwise complex sources get the smaller configured default, and
    /// the packaged format biases the choice further down, capped at the
    /// configured maximum.
    pub fn resolve(
        config: &RfExportConfig,
        packaged: bool,
        shape: &RfQueryShape,
        requested: Option<usize>,
    ) -> Result<Self> {
        let current = match requested {
            Some(0) => return Err(RfError::InvalidChunkSize(0)),
            Some(size) => size,
            None => {
                let heuristic = if shape.is_complex() {
                    config.chunk.complex_size
                } else {
                    config.chunk.simple_size
                };
                let biased = if packaged {
                    heuristic.min(config.chunk.packaged_size)
                } else {
                    heuristic
                };
                biased.clamp(1, config.chunk.max_size)
            }
        };
        Ok(Self {
            current,
            floor: config.chunk.min_size.max(1),
            memory_limit_bytes: config.guardrails.memory_limit_bytes,
            memory_warn_fraction: config.guardrails.memory_warn_fraction,
        })
    }

    /// The size to use for the next chunk.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Runtime feedback step, called once per chunk boundary.
    ///
    /// Halves the size (never below the floor) when resident memory exceeds
    /// the warning fraction of the ceiling. An unavailable reading leaves
    /// the size untouched: no feedback beats false feedback.
    pub fn adjust(&mut self, probe: &dyn RfMemoryProbe) -> usize {
        if let Some(resident) = probe.resident_bytes() {
            let threshold = self.memory_warn_fraction * self.memory_limit_bytes as f64;
            if self.memory_limit_bytes > 0 && resident as f64 > threshold {
                let halved = (self.current / 2).max(self.floor);
                if halved < self.current {
                    log::warn!(
                        "memory pressure ({resident} bytes resident): shrinking chunk size {} -> {halved}",
                        self.current
                    );
                    self.current = halved;
                }
            }
        }
        self.current
    }
}
