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

//! # Rowflow Sheet Module
//!
//! Sheet specifications for multi-sheet workbook exports and their
//! validation rules.

use std::collections::HashSet;

use crate::config::RfSheetConfig;
use crate::errors::{Result, RfError};
use crate::source::RfDataSource;

/// Characters forbidden in sheet names by the spreadsheet format.
const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', '?', '*', '[', ']', ':'];

/// One worksheet of a workbook export: a name, a data source (whose headers
/// are the sheet columns), and an optional per-sheet chunk size.
pub struct RfSheetSpec {
    pub name: String,
    pub source: Box<dyn RfDataSource>,
    pub chunk_size: Option<usize>,
}

impl RfSheetSpec {
    pub fn new(name: impl Into<String>, source: Box<dyn RfDataSource>) -> Self {
        Self {
            name: name.into(),
            source,
            chunk_size: None,
        }
    }

    /// Overrides the chunk size for this sheet only.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }
}

/// Validates a workbook's sheet list before any output is produced.
///
/// Names must be unique (case-insensitive, matching spreadsheet apps), at
/// most the configured length, and free of the forbidden characters; each
/// sheet must declare at least one column.
pub(crate) fn validate_sheets(sheets: &[RfSheetSpec], config: &RfSheetConfig) -> Result<()> {
    if sheets.is_empty() {
        return Err(RfError::invalid_sheet("workbook needs at least one sheet"));
    }
    if sheets.len() > config.max_sheets {
        return Err(RfError::invalid_sheet(format!(
            "too many sheets: {} (limit {})",
            sheets.len(),
            config.max_sheets
        )));
    }

    let mut seen = HashSet::new();
    for sheet in sheets {
        if sheet.name.is_empty() {
            return Err(RfError::invalid_sheet("sheet name must not be empty"));
        }
        if sheet.name.chars().count() > config.max_name_len {
            return Err(RfError::invalid_sheet(format!(
                "sheet name '{}' exceeds {} characters",
                sheet.name, config.max_name_len
            )));
        }
        if let Some(bad) = sheet.name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return Err(RfError::invalid_sheet(format!(
                "sheet name '{}' contains forbidden character '{bad}'",
                sheet.name
            )));
        }
        if !seen.insert(sheet.name.to_lowercase()) {
            return Err(RfError::invalid_sheet(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        if sheet.source.headers().is_empty() {
            return Err(RfError::invalid_sheet(format!(
                "sheet '{}' declares no columns",
                sheet.name
            )));
        }
        if let Some(0) = sheet.chunk_size {
            return Err(RfError::InvalidChunkSize(0));
        }
    }
    Ok(())
}
