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

//! # Rowflow Configuration Module
//!
//! One immutable configuration struct threaded through constructors. No
//! component reads ambient or process-global configuration; everything an
//! export needs is captured in [`RfExportConfig`] at construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Chunk-size resolution parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfChunkConfig {
    /// Size used when no heuristic applies.
    pub default_size: usize,
    /// Floor for memory-pressure halving.
    pub min_size: usize,
    /// Upper bound for heuristic sizes.
    pub max_size: usize,
    /// Default for sources classified as simple.
    pub simple_size: usize,
    /// Default for sources classified as complex (joins, sub-selects,
    /// grouping, or more than two order clauses).
    pub complex_size: usize,
    /// Bias applied when the packaged spreadsheet format is requested.
    pub packaged_size: usize,
}

impl Default for RfChunkConfig {
    fn default() -> Self {
        Self {
            default_size: 1000,
            min_size: 50,
            max_size: 10_000,
            simple_size: 2000,
            complex_size: 500,
            packaged_size: 500,
        }
    }
}

/// Memory and execution-time guardrail parameters.
///
/// Guardrails emit warnings only; they never abort an export. The hard
/// external time limit lives outside this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfGuardrailConfig {
    /// Memory ceiling the process is expected to stay under.
    pub memory_limit_bytes: u64,
    /// Fraction of the ceiling above which warnings fire and the chunk
    /// size is halved.
    pub memory_warn_fraction: f64,
    /// Execution-time budget for one export.
    pub time_budget: Duration,
    /// Fraction of the budget after which a warning fires.
    pub time_warn_fraction: f64,
}

impl Default for RfGuardrailConfig {
    fn default() -> Self {
        Self {
            memory_limit_bytes: 512 * 1024 * 1024,
            memory_warn_fraction: 0.8,
            time_budget: Duration::from_secs(300),
            time_warn_fraction: 0.8,
        }
    }
}

/// CSV rendering parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfCsvConfig {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte used to wrap fields containing specials.
    pub quote: u8,
    /// Escape byte; `None` doubles the quote byte instead (RFC 4180).
    pub escape: Option<u8>,
    /// Terminate records with CRLF instead of LF.
    pub crlf: bool,
}

impl Default for RfCsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            crlf: false,
        }
    }
}

/// Filename sanitizing and timestamping policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfFilenameConfig {
    /// Reduce the requested name to a lowercase slug.
    pub sanitize: bool,
    /// Append a timestamp suffix to the name.
    pub timestamp: bool,
    /// chrono format string for the suffix.
    pub timestamp_format: String,
}

impl Default for RfFilenameConfig {
    fn default() -> Self {
        Self {
            sanitize: true,
            timestamp: true,
            timestamp_format: "%Y%m%d-%H%M%S".to_string(),
        }
    }
}

/// Limits applied to multi-sheet workbook exports.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfSheetConfig {
    /// Maximum number of sheets per workbook.
    pub max_sheets: usize,
    /// Maximum sheet-name length in characters.
    pub max_name_len: usize,
}

impl Default for RfSheetConfig {
    fn default() -> Self {
        Self {
            max_sheets: 20,
            max_name_len: 31,
        }
    }
}

/// Complete configuration surface consumed by the export engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RfExportConfig {
    pub chunk: RfChunkConfig,
    pub guardrails: RfGuardrailConfig,
    pub csv: RfCsvConfig,
    pub filename: RfFilenameConfig,
    pub sheets: RfSheetConfig,
}
