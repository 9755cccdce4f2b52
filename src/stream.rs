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

//! # Rowflow CSV Stream Writer
//!
//! Drains a data source through the CSV row encoder directly to the output
//! transport, chunk by chunk, with no intermediate file. This is the only
//! truly streaming path: the transport is flushed after every chunk, before
//! the next chunk is requested, so bytes may reach the consumer while the
//! source is still being read.
//!
//! Once streaming has begun there is no atomicity guarantee; bytes already
//! flushed cannot be retracted on failure.

use crate::chunking::RfChunkSizer;
use crate::config::RfCsvConfig;
use crate::encode::RfCsvRowEncoder;
use crate::errors::{Result, RfError};
use crate::exporter::RfExportJob;
use crate::source::{shape_chunk, RfDataSource};
use crate::transport::RfTransport;

/// Writer lifecycle. Failure at any point transitions directly to `Closed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RfStreamState {
    NotStarted,
    HeaderWritten,
    Streaming,
    Closed,
}

/// Chunked CSV writer over an output transport.
pub struct RfCsvStreamWriter {
    encoder: RfCsvRowEncoder,
    state: RfStreamState,
}

impl RfCsvStreamWriter {
    pub fn new(config: &RfCsvConfig) -> Self {
        Self {
            encoder: RfCsvRowEncoder::new(config),
            state: RfStreamState::NotStarted,
        }
    }

    /// Streams the whole source to the transport. Rows come out in exactly
    /// the order the source yields them; chunk boundaries are invisible in
    /// the byte stream.
    ///
    /// A writer streams once; any further call fails without touching the
    /// transport.
    pub fn stream(
        &mut self,
        source: &mut dyn RfDataSource,
        sizer: &mut RfChunkSizer,
        transport: &mut dyn RfTransport,
        job: &mut RfExportJob<'_>,
    ) -> Result<()> {
        if self.state != RfStreamState::NotStarted {
            return Err(RfError::streaming("csv stream writer cannot be reused"));
        }
        let outcome = self.run(source, sizer, transport, job);
        self.state = RfStreamState::Closed;
        outcome
    }

    fn run(
        &mut self,
        source: &mut dyn RfDataSource,
        sizer: &mut RfChunkSizer,
        transport: &mut dyn RfTransport,
        job: &mut RfExportJob<'_>,
    ) -> Result<()> {
        let headers: Vec<String> = source.headers().to_vec();
        let header_line = self.encoder.encode_header(&headers)?;
        transport.write_all(header_line)?;
        job.add_bytes(header_line.len());
        self.state = RfStreamState::HeaderWritten;

        loop {
            let size = sizer.current();
            let chunk = match source.next_chunk(size)? {
                Some(chunk) => chunk,
                None => break,
            };
            if self.state == RfStreamState::HeaderWritten {
                self.state = RfStreamState::Streaming;
            }

            let (shaped, degraded) = shape_chunk(&chunk, &headers, source.row_transform());
            job.note_degraded(degraded);
            for values in &shaped {
                let line = self.encoder.encode_row(values)?;
                transport.write_all(line)?;
                job.add_bytes(line.len());
            }

            // Yield to the transport before pulling the next chunk.
            transport.flush()?;
            job.note_chunk(shaped.len());
            sizer.adjust(job.probe());
        }

        transport.flush()?;
        Ok(())
    }
}
