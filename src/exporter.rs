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

//! # Rowflow Export Orchestrator
//!
//! Public façade for the export engine. Validates the request, applies the
//! filename policy, sends the response head, and dispatches to the CSV
//! streaming path or the workbook package builder. Owns the time and
//! memory guardrails and the lifecycle events sent to the export listener.
//!
//! One export is one logical thread of control: retrieval, encoding, and
//! transport writes run strictly sequentially, so source fetches and
//! transport backpressure are the only blocking points. Concurrent exports
//! share nothing but the immutable configuration.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::chunking::{RfChunkSizer, RfMemoryProbe, RfProcMemoryProbe};
use crate::config::RfExportConfig;
use crate::errors::{Result, RfError};
use crate::events::{RfExportListener, RfLogListener};
use crate::filename::build_filename;
use crate::package::RfWorkbookBuilder;
use crate::record::RfRow;
use crate::sheet::{validate_sheets, RfSheetSpec};
use crate::source::{RfArraySource, RfDataSource};
use crate::stream::RfCsvStreamWriter;
use crate::transport::{RfResponseHead, RfTransport};

/// Supported export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfExportFormat {
    /// Line-delimited CSV, streamed end to end.
    Csv,
    /// ZIP-based OOXML spreadsheet package, materialized locally first.
    Xlsx,
}

impl RfExportFormat {
    /// Parses a requested format name. Only `csv` and `xlsx` exist.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Ok(RfExportFormat::Csv),
            "xlsx" => Ok(RfExportFormat::Xlsx),
            other => Err(RfError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RfExportFormat::Csv => "csv",
            RfExportFormat::Xlsx => "xlsx",
        }
    }

    /// File extension forced onto the download filename.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RfExportFormat::Csv => "text/csv",
            RfExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Whether this format goes through the package builder.
    pub fn is_packaged(&self) -> bool {
        matches!(self, RfExportFormat::Xlsx)
    }
}

/// Caller-supplied options for one export request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RfExportOptions {
    /// Requested format name; defaults to `csv`.
    pub format: Option<String>,
    /// Explicit chunk size, overriding every heuristic.
    pub chunk_size: Option<usize>,
}

/// Final counters for a completed export.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RfExportStats {
    pub records: u64,
    pub chunks: u64,
    pub bytes: u64,
    pub degraded_rows: u64,
    pub duration_ms: u64,
    pub peak_memory_bytes: Option<u64>,
}

/// Mutable bookkeeping for one in-flight export. Owned by the orchestrator
/// thread of control and discarded when the response completes or errors.
pub struct RfExportJob<'a> {
    filename: String,
    config: &'a RfExportConfig,
    listener: &'a dyn RfExportListener,
    probe: &'a dyn RfMemoryProbe,
    started: Instant,
    records: u64,
    chunks: u64,
    bytes: u64,
    degraded_rows: u64,
    peak_memory: Option<u64>,
    time_warned: bool,
}

impl<'a> RfExportJob<'a> {
    pub(crate) fn new(
        filename: String,
        config: &'a RfExportConfig,
        listener: &'a dyn RfExportListener,
        probe: &'a dyn RfMemoryProbe,
    ) -> Self {
        Self {
            filename,
            config,
            listener,
            probe,
            started: Instant::now(),
            records: 0,
            chunks: 0,
            bytes: 0,
            degraded_rows: 0,
            peak_memory: None,
            time_warned: false,
        }
    }

    pub(crate) fn probe(&self) -> &dyn RfMemoryProbe {
        self.probe
    }

    pub(crate) fn add_bytes(&mut self, count: usize) {
        self.bytes += count as u64;
    }

    pub(crate) fn note_degraded(&mut self, count: u64) {
        self.degraded_rows += count;
    }

    /// Per-chunk bookkeeping: counters, the chunk-processed event, and the
    /// memory/time guardrail samples. Guardrails warn, never abort; the
    /// hard external time limit is outside this crate's control.
    pub(crate) fn note_chunk(&mut self, records_in_chunk: usize) {
        self.chunks += 1;
        self.records += records_in_chunk as u64;
        self.listener
            .chunk_processed(self.chunks, records_in_chunk, self.records);

        let guardrails = &self.config.guardrails;
        if let Some(resident) = self.probe.resident_bytes() {
            self.peak_memory = Some(self.peak_memory.map_or(resident, |peak| peak.max(resident)));
            let threshold = guardrails.memory_warn_fraction * guardrails.memory_limit_bytes as f64;
            if guardrails.memory_limit_bytes > 0 && resident as f64 > threshold {
                log::warn!(
                    "export '{}': resident memory {resident} bytes exceeds {:.0}% of the {} byte ceiling",
                    self.filename,
                    guardrails.memory_warn_fraction * 100.0,
                    guardrails.memory_limit_bytes
                );
            }
        }

        let elapsed = self.started.elapsed();
        let budget = guardrails.time_budget;
        if !self.time_warned
            && budget > Duration::ZERO
            && elapsed.as_secs_f64() > budget.as_secs_f64() * guardrails.time_warn_fraction
        {
            self.time_warned = true;
            log::warn!(
                "export '{}': {elapsed:?} elapsed, nearing the {budget:?} execution budget",
                self.filename
            );
        }
    }

    fn records(&self) -> u64 {
        self.records
    }

    fn stats(&self) -> RfExportStats {
        RfExportStats {
            records: self.records,
            chunks: self.chunks,
            bytes: self.bytes,
            degraded_rows: self.degraded_rows,
            duration_ms: self.started.elapsed().as_millis() as u64,
            peak_memory_bytes: self.peak_memory,
        }
    }
}

/// The export engine façade.
pub struct RfExporter {
    config: RfExportConfig,
    listener: Box<dyn RfExportListener>,
    probe: Box<dyn RfMemoryProbe>,
}

impl RfExporter {
    pub fn new(config: RfExportConfig) -> Self {
        Self {
            config,
            listener: Box::new(RfLogListener),
            probe: Box::new(RfProcMemoryProbe),
        }
    }

    /// Replaces the lifecycle-event listener.
    pub fn with_listener(mut self, listener: Box<dyn RfExportListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Replaces the memory probe consulted by the guardrails.
    pub fn with_memory_probe(mut self, probe: Box<dyn RfMemoryProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Exports one data source in the requested format.
    ///
    /// Validation (format, chunk size) happens before the response head is
    /// sent, and packaged exports assemble the whole archive locally before
    /// the head is sent, so their failures stay structured errors. Failures
    /// after the first payload byte terminate the stream and surface
    /// through the failed event with progress context.
    pub fn export_source(
        &self,
        source: Box<dyn RfDataSource>,
        filename: &str,
        options: &RfExportOptions,
        transport: &mut dyn RfTransport,
    ) -> Result<RfExportStats> {
        let format = RfExportFormat::from_name(options.format.as_deref().unwrap_or("csv"))?;
        let mut sizer = RfChunkSizer::resolve(
            &self.config,
            format.is_packaged(),
            &source.shape(),
            options.chunk_size,
        )?;

        let resolved = build_filename(filename, format.extension(), &self.config.filename);
        self.listener
            .export_started(&resolved, source.total_count(), format.as_str());
        let mut job = RfExportJob::new(
            resolved.clone(),
            &self.config,
            self.listener.as_ref(),
            self.probe.as_ref(),
        );

        let outcome = self.run_export(source, format, &resolved, &mut sizer, transport, &mut job);
        self.finish(outcome, &resolved, &job)
    }

    /// Exports an in-memory row collection; fails fast when it is empty.
    pub fn export_rows(
        &self,
        rows: Vec<RfRow>,
        headers: Vec<String>,
        filename: &str,
        options: &RfExportOptions,
        transport: &mut dyn RfTransport,
    ) -> Result<RfExportStats> {
        let source = RfArraySource::new(rows, headers)?;
        self.export_source(Box::new(source), filename, options, transport)
    }

    /// Exports a multi-sheet workbook. The packaged format is forced.
    pub fn export_sheets(
        &self,
        mut sheets: Vec<RfSheetSpec>,
        filename: &str,
        options: &RfExportOptions,
        transport: &mut dyn RfTransport,
    ) -> Result<RfExportStats> {
        validate_sheets(&sheets, &self.config.sheets)?;
        if let Some(0) = options.chunk_size {
            return Err(RfError::InvalidChunkSize(0));
        }
        for sheet in &mut sheets {
            sheet.chunk_size = sheet.chunk_size.or(options.chunk_size);
        }

        let format = RfExportFormat::Xlsx;
        let resolved = build_filename(filename, format.extension(), &self.config.filename);
        let expected = sheets
            .iter()
            .map(|s| s.source.total_count())
            .try_fold(0u64, |sum, count| count.map(|c| sum + c));
        self.listener
            .export_started(&resolved, expected, format.as_str());
        let mut job = RfExportJob::new(
            resolved.clone(),
            &self.config,
            self.listener.as_ref(),
            self.probe.as_ref(),
        );

        let head = RfResponseHead::attachment(format.content_type(), &resolved);
        let outcome = RfWorkbookBuilder::new(&self.config)
            .build_and_stream(&mut sheets, &head, transport, &mut job);
        self.finish(outcome, &resolved, &job)
    }

    fn run_export(
        &self,
        source: Box<dyn RfDataSource>,
        format: RfExportFormat,
        resolved: &str,
        sizer: &mut RfChunkSizer,
        transport: &mut dyn RfTransport,
        job: &mut RfExportJob<'_>,
    ) -> Result<()> {
        let head = RfResponseHead::attachment(format.content_type(), resolved);
        match format {
            RfExportFormat::Csv => {
                transport.begin(&head)?;
                let mut source = source;
                RfCsvStreamWriter::new(&self.config.csv).stream(
                    source.as_mut(),
                    sizer,
                    transport,
                    job,
                )
            }
            RfExportFormat::Xlsx => {
                // Single-source packaged exports reuse the workbook path
                // with one default-named sheet. The builder commits the
                // head itself, after local assembly has succeeded.
                let mut sheets = vec![RfSheetSpec::new("Sheet1", source)];
                sheets[0].chunk_size = Some(sizer.current());
                RfWorkbookBuilder::new(&self.config)
                    .build_and_stream(&mut sheets, &head, transport, job)
            }
        }
    }

    fn finish(
        &self,
        outcome: Result<()>,
        resolved: &str,
        job: &RfExportJob<'_>,
    ) -> Result<RfExportStats> {
        match outcome {
            Ok(()) => {
                let stats = job.stats();
                self.listener
                    .export_completed(resolved, stats.records, stats.bytes);
                Ok(stats)
            }
            Err(error) => {
                self.listener.export_failed(resolved, &error, job.records());
                Err(error)
            }
        }
    }
}
