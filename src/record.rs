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

//! # Rowflow Record Module
//!
//! Core data structures for one logical row of an export.
//!
//! A row is a JSON object mapping column names to scalar values. Column
//! order is never taken from the map; the declared header list owns field
//! order and field count for the lifetime of an export, and every row is
//! projected against it before encoding.

use serde_json::{Map, Value};

/// One logical row: column name to scalar value.
pub type RfRow = Map<String, Value>;

/// A bounded batch of rows, the unit of memory residency.
pub type RfChunk = Vec<RfRow>;

/// Optional per-record hook producing a custom export row instead of plain
/// column projection. A hook failure degrades that record to its projected
/// form; it never aborts the chunk.
pub type RfRowTransform = Box<dyn Fn(&RfRow) -> std::result::Result<RfRow, String> + Send + Sync>;

/// Projects a row against the declared header list, in header order.
///
/// Missing columns become null so every emitted row has exactly one value
/// per header.
pub fn project_row(row: &RfRow, headers: &[String]) -> Vec<Value> {
    headers
        .iter()
        .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Coerces a scalar cell value to its text form.
///
/// Numbers and booleans render via their canonical string form, null is
/// the empty string. Nested structures fall back to compact JSON text
/// rather than failing the row.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
