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

use crate::errors::{Result, RfError};
use crate::record::{RfChunk, RfRow, RfRowTransform};
use crate::source::{RfDataSource, RfQueryShape};

/// Array-backed data source: slices a fixed in-memory collection into
/// size-bounded chunks.
pub struct RfArraySource {
    rows: Vec<RfRow>,
    headers: Vec<String>,
    cursor: usize,
    transform: Option<RfRowTransform>,
    shape: RfQueryShape,
}

impl RfArraySource {
    /// Builds a source over an in-memory collection. An empty collection is
    /// rejected before any output can be produced.
    pub fn new(rows: Vec<RfRow>, headers: Vec<String>) -> Result<Self> {
        if rows.is_empty() {
            return Err(RfError::empty_dataset("cannot export an empty row collection"));
        }
        let shape = RfQueryShape {
            selected: headers.clone(),
            ..RfQueryShape::default()
        };
        Ok(Self {
            rows,
            headers,
            cursor: 0,
            transform: None,
            shape,
        })
    }

    /// Attaches a per-record transform hook.
    pub fn with_transform(mut self, transform: RfRowTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl RfDataSource for RfArraySource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn total_count(&self) -> Option<u64> {
        Some(self.rows.len() as u64)
    }

    fn next_chunk(&mut self, size: usize) -> Result<Option<RfChunk>> {
        if size == 0 {
            return Err(RfError::InvalidChunkSize(0));
        }
        if self.cursor >= self.rows.len() {
            return Ok(None);
        }
        let end = (self.cursor + size).min(self.rows.len());
        let chunk = self.rows[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(Some(chunk))
    }

    fn row_transform(&self) -> Option<&RfRowTransform> {
        self.transform.as_ref()
    }

    fn shape(&self) -> RfQueryShape {
        self.shape.clone()
    }
}
