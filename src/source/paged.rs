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
use crate::source::{RfDataSource, RfOrdering, RfQueryShape};

/// Collaborator issuing one offset/limit retrieval against the underlying
/// store. The ordering resolved at source construction is passed with every
/// fetch so successive pages see the same total order.
pub trait RfPageFetcher {
    fn fetch_page(&mut self, order: &RfOrdering, offset: u64, limit: usize) -> Result<Vec<RfRow>>;
}

/// Paged-query-backed data source: drains a fetcher through successive
/// offset/limit retrievals under a deterministic total order.
///
/// A page shorter than requested terminates the sequence; reading past the
/// end of an offset-paginated result set yields nothing new.
pub struct RfPagedSource {
    fetcher: Box<dyn RfPageFetcher>,
    headers: Vec<String>,
    shape: RfQueryShape,
    ordering: RfOrdering,
    offset: u64,
    total: Option<u64>,
    exhausted: bool,
    transform: Option<RfRowTransform>,
}

impl RfPagedSource {
    pub fn new(fetcher: Box<dyn RfPageFetcher>, headers: Vec<String>, shape: RfQueryShape) -> Self {
        let ordering = shape.effective_order();
        if ordering == RfOrdering::Constant {
            log::warn!(
                "paged source has no usable ordering column; falling back to constant ordering \
                 (rows may be skipped or duplicated under concurrent writes)"
            );
        }
        Self {
            fetcher,
            headers,
            shape,
            ordering,
            offset: 0,
            total: None,
            exhausted: false,
            transform: None,
        }
    }

    /// Declares the total row count when the caller already knows it.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Attaches a per-record transform hook.
    pub fn with_transform(mut self, transform: RfRowTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The ordering this source resolved at construction.
    pub fn ordering(&self) -> &RfOrdering {
        &self.ordering
    }
}

impl RfDataSource for RfPagedSource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn total_count(&self) -> Option<u64> {
        self.total
    }

    fn next_chunk(&mut self, size: usize) -> Result<Option<RfChunk>> {
        if size == 0 {
            return Err(RfError::InvalidChunkSize(0));
        }
        if self.exhausted {
            return Ok(None);
        }
        let page = self.fetcher.fetch_page(&self.ordering, self.offset, size)?;
        if page.len() < size {
            self.exhausted = true;
        }
        if page.is_empty() {
            return Ok(None);
        }
        self.offset += page.len() as u64;
        Ok(Some(page))
    }

    fn row_transform(&self) -> Option<&RfRowTransform> {
        self.transform.as_ref()
    }

    fn shape(&self) -> RfQueryShape {
        self.shape.clone()
    }
}
