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

//! # Rowflow Row Encoder Module
//!
//! Format-specific, stateless per-row encoders: one logical row in, CSV
//! bytes or an OOXML inline-string row fragment out.
//!
//! Spreadsheet cells are always inline strings; numbers and booleans are
//! coerced to text before escaping. That keeps the writer fully streaming
//! (no shared-string table to accumulate) at the cost of Excel treating
//! every cell as text.

use csv::{Terminator, WriterBuilder};
use serde_json::Value;

use crate::config::RfCsvConfig;
use crate::errors::{Result, RfError};
use crate::record::cell_text;

/// CSV encoder honoring the configured delimiter/quote/escape triple.
/// Embedded quote, delimiter, and newline bytes are handled by the
/// standard CSV quoting rule (wrap in the quote byte, double embedded
/// quote bytes) unless an explicit escape byte is configured.
///
/// The writer configuration is fixed at construction and a scratch buffer
/// is reused across rows; each encode call returns a view into it that is
/// valid until the next call.
pub struct RfCsvRowEncoder {
    builder: WriterBuilder,
    scratch: Vec<u8>,
}

impl RfCsvRowEncoder {
    pub fn new(config: &RfCsvConfig) -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(config.delimiter)
            .quote(config.quote)
            .terminator(if config.crlf {
                Terminator::CRLF
            } else {
                Terminator::Any(b'\n')
            });
        if let Some(escape) = config.escape {
            builder.double_quote(false).escape(escape);
        }
        Self {
            builder,
            scratch: Vec::new(),
        }
    }

    /// Renders the header record.
    pub fn encode_header(&mut self, headers: &[String]) -> Result<&[u8]> {
        self.encode_fields(headers.iter().map(String::as_str))
    }

    /// Renders one row of already-projected values.
    pub fn encode_row(&mut self, values: &[Value]) -> Result<&[u8]> {
        let fields: Vec<String> = values.iter().map(cell_text).collect();
        self.encode_fields(fields.iter().map(String::as_str))
    }

    fn encode_fields<'a>(&mut self, fields: impl Iterator<Item = &'a str>) -> Result<&[u8]> {
        let mut buf = std::mem::take(&mut self.scratch);
        buf.clear();
        let mut writer = self.builder.from_writer(buf);
        writer.write_record(fields)?;
        self.scratch = writer
            .into_inner()
            .map_err(|e| RfError::streaming(format!("csv buffer flush failed: {e}")))?;
        Ok(&self.scratch)
    }
}

/// Stateless OOXML worksheet-row encoder emitting inline-string cells.
pub struct RfSheetRowEncoder;

impl RfSheetRowEncoder {
    /// Renders one `<row>` element at the given 1-based spreadsheet index.
    pub fn encode_row(&self, row_index: u64, values: &[Value]) -> String {
        let mut out = String::with_capacity(64 + values.len() * 48);
        out.push_str(&format!("<row r=\"{row_index}\">"));
        for (column, value) in values.iter().enumerate() {
            let cell_ref = format!("{}{row_index}", column_letter(column as u32 + 1));
            out.push_str(&format!(
                "<c r=\"{cell_ref}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                xml_escape(&cell_text(value))
            ));
        }
        out.push_str("</row>");
        out
    }

    /// Renders the header row at spreadsheet row index 1.
    pub fn encode_header(&self, headers: &[String]) -> String {
        let values: Vec<Value> = headers.iter().map(|h| Value::String(h.clone())).collect();
        self.encode_row(1, &values)
    }
}

/// Converts a 1-based column index to its spreadsheet letter form using
/// bijective base-26: 1 -> A, 26 -> Z, 27 -> AA.
pub fn column_letter(index: u32) -> String {
    debug_assert!(index >= 1);
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Entity-escapes XML special characters.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
