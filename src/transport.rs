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

//! # Rowflow Transport Module
//!
//! The output-transport seam: an append-only byte sink with explicit flush
//! semantics. Response metadata is delivered exactly once before the first
//! payload byte; writes may block on backpressure, which is the desired
//! behavior (the producer never outruns the consumer).

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RfError};

/// Response metadata sent once before any payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfResponseHead {
    pub content_type: String,
    pub content_disposition: String,
}

impl RfResponseHead {
    /// Head for an attachment download with the given filename.
    pub fn attachment(content_type: &str, filename: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            content_disposition: format!("attachment; filename=\"{filename}\""),
        }
    }
}

/// Append-only byte sink consumed by the export engine.
pub trait RfTransport {
    /// Delivers the response head. Called exactly once, before any payload.
    fn begin(&mut self, head: &RfResponseHead) -> Result<()>;

    /// Appends payload bytes.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Yields control to the transport so buffered bytes can be delivered.
    fn flush(&mut self) -> Result<()>;
}

/// In-memory transport capturing everything the engine emits. Used by tests
/// and as a reference implementation of the contract.
#[derive(Default)]
pub struct RfMemoryTransport {
    head: Option<RfResponseHead>,
    bytes: Vec<u8>,
    flushes: usize,
}

impl RfMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(&self) -> Option<&RfResponseHead> {
        self.head.as_ref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl RfTransport for RfMemoryTransport {
    fn begin(&mut self, head: &RfResponseHead) -> Result<()> {
        if self.head.is_some() {
            return Err(RfError::streaming("response head sent twice"));
        }
        self.head = Some(head.clone());
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Adapter over any [`Write`] sink. The head is retained for the caller to
/// deliver out of band (an HTTP layer would map it onto response headers).
pub struct RfWriterTransport<W: Write> {
    inner: W,
    head: Option<RfResponseHead>,
}

impl<W: Write> RfWriterTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, head: None }
    }

    pub fn head(&self) -> Option<&RfResponseHead> {
        self.head.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RfTransport for RfWriterTransport<W> {
    fn begin(&mut self, head: &RfResponseHead) -> Result<()> {
        if self.head.is_some() {
            return Err(RfError::streaming("response head sent twice"));
        }
        self.head = Some(head.clone());
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner
            .write_all(buf)
            .map_err(|e| RfError::streaming(format!("transport write failed: {e}")))
    }

    fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| RfError::streaming(format!("transport flush failed: {e}")))
    }
}
