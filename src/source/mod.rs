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

//! # Rowflow Data Source Module
//!
//! The data-chunk retrieval abstraction: a polymorphic sequence that yields
//! bounded batches of rows on demand.
//!
//! Sources are created per export, forward-only, and non-restartable; the
//! suspension point of the stream is exactly the boundary between chunks,
//! expressed as an explicit `next_chunk` cursor rather than hidden
//! coroutine state. Optional capabilities (total count, a per-record
//! transform hook) are probed through trait methods with defaults, not
//! through downcasting.

pub mod array;
pub mod paged;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::record::{project_row, RfChunk, RfRow, RfRowTransform};

pub use array::RfArraySource;
pub use paged::{RfPageFetcher, RfPagedSource};

/// A lazy, forward-only sequence of row chunks plus header metadata.
pub trait RfDataSource {
    /// Ordered column labels, fixed for the lifetime of the export.
    fn headers(&self) -> &[String];

    /// Total row count when the source can know it cheaply.
    fn total_count(&self) -> Option<u64> {
        None
    }

    /// Pulls the next chunk of at most `size` rows. Returns `Ok(None)` once
    /// the sequence is exhausted; a source is not restartable afterwards.
    fn next_chunk(&mut self, size: usize) -> Result<Option<RfChunk>>;

    /// Optional per-record transform capability.
    fn row_transform(&self) -> Option<&RfRowTransform> {
        None
    }

    /// Explicit descriptor of the underlying query, used for chunk-size
    /// classification and ordering injection.
    fn shape(&self) -> RfQueryShape {
        RfQueryShape::default()
    }
}

/// Explicit descriptor of a source's query, passed alongside the source
/// instead of being introspected out of it after construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RfQueryShape {
    /// Selected column names, in selection order.
    pub selected: Vec<String>,
    /// Primary-key column when the source knows one.
    pub primary_key: Option<String>,
    /// Declared order clauses.
    pub order_by: Vec<String>,
    /// Number of joined relations.
    pub joins: usize,
    /// Query contains sub-selects.
    pub has_subselects: bool,
    /// Query groups rows.
    pub has_grouping: bool,
}

impl RfQueryShape {
    /// Classifies the query for chunk-size selection. Joins, sub-selects,
    /// grouping, or more than two order clauses all make retrieval per row
    /// more expensive, so such sources get smaller chunks.
    pub fn is_complex(&self) -> bool {
        self.joins > 0 || self.has_subselects || self.has_grouping || self.order_by.len() > 2
    }

    /// Resolves the total order used for offset pagination.
    ///
    /// Offset reads without a stable order can skip or duplicate rows under
    /// concurrent writes, so when no order is declared one is injected:
    /// primary key, else an `id`-like selected column, else the first
    /// selected column, else a constant ordering as a last resort. The
    /// constant fallback only narrows the exposure window; it cannot close
    /// it.
    pub fn effective_order(&self) -> RfOrdering {
        if !self.order_by.is_empty() {
            return RfOrdering::Declared(self.order_by.clone());
        }
        if let Some(key) = &self.primary_key {
            return RfOrdering::Key(key.clone());
        }
        if let Some(id_like) = self.selected.iter().find(|name| {
            let lower = name.to_ascii_lowercase();
            lower == "id" || lower.ends_with("_id")
        }) {
            return RfOrdering::Key(id_like.clone());
        }
        if let Some(first) = self.selected.first() {
            return RfOrdering::Key(first.clone());
        }
        RfOrdering::Constant
    }
}

/// Total order applied to offset-paginated retrieval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfOrdering {
    /// Order clauses the caller declared.
    Declared(Vec<String>),
    /// A single injected ordering column.
    Key(String),
    /// Constant ordering; last-resort fallback with no stability guarantee.
    Constant,
}

/// Shapes one chunk of retrieved rows into header-ordered value lists.
///
/// Each row goes through the source's transform hook when present,
/// otherwise plain column projection. A hook failure on a single record
/// replaces that record with its projected form and is logged; the chunk is
/// never aborted. Returns the shaped rows and the number of degraded
/// records.
pub(crate) fn shape_chunk(
    chunk: &RfChunk,
    headers: &[String],
    transform: Option<&RfRowTransform>,
) -> (Vec<Vec<Value>>, u64) {
    let mut degraded = 0u64;
    let shaped = chunk
        .iter()
        .map(|row| shape_row(row, headers, transform, &mut degraded))
        .collect();
    (shaped, degraded)
}

fn shape_row(
    row: &RfRow,
    headers: &[String],
    transform: Option<&RfRowTransform>,
    degraded: &mut u64,
) -> Vec<Value> {
    match transform {
        Some(hook) => match hook(row) {
            Ok(shaped) => project_row(&shaped, headers),
            Err(reason) => {
                *degraded += 1;
                log::warn!("row transform failed, falling back to column projection: {reason}");
                project_row(row, headers)
            }
        },
        None => project_row(row, headers),
    }
}
