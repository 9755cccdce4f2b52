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

//! # Rowflow Filename Module
//!
//! Download-filename policy: slug sanitizing, optional timestamp suffix,
//! extension forced to the resolved format.

use std::path::Path;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::config::RfFilenameConfig;

static SLUG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn slug_pattern() -> &'static Regex {
    SLUG_PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"))
}

/// Builds the attachment filename for one export.
///
/// Any extension on the requested name is dropped before the policy runs;
/// the resolved format owns the final extension.
pub fn build_filename(requested: &str, extension: &str, config: &RfFilenameConfig) -> String {
    let stem = Path::new(requested)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(requested);

    let mut name = if config.sanitize {
        slug(stem)
    } else {
        stem.to_string()
    };
    if name.is_empty() {
        name = "export".to_string();
    }
    if config.timestamp {
        name.push('-');
        name.push_str(&Utc::now().format(&config.timestamp_format).to_string());
    }
    format!("{name}.{extension}")
}

fn slug(raw: &str) -> String {
    slug_pattern()
        .replace_all(&raw.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
