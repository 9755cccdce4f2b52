//! Copyright © 2025-2026 The Rowflow Authors. All Rights Reserved.
//!
//! This file is part of Rowflow.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use serde_json::{json, Value};

use rowflow::{
    RfArraySource, RfDataSource, RfError, RfOrdering, RfPageFetcher, RfPagedSource, RfQueryShape,
    RfRow,
};

fn row(value: Value) -> RfRow {
    value.as_object().cloned().expect("object row")
}

fn people(count: usize) -> Vec<RfRow> {
    (0..count)
        .map(|i| row(json!({"name": format!("p{i}"), "rank": i})))
        .collect()
}

fn headers() -> Vec<String> {
    vec!["name".to_string(), "rank".to_string()]
}

#[test]
fn array_source_rejects_empty_collection() {
    let result = RfArraySource::new(Vec::new(), headers());
    assert!(matches!(result, Err(RfError::EmptyDataset(_))));
}

#[test]
fn array_source_slices_into_bounded_chunks() {
    let mut source = RfArraySource::new(people(5), headers()).unwrap();
    assert_eq!(source.total_count(), Some(5));

    let sizes: Vec<usize> = std::iter::from_fn(|| source.next_chunk(2).unwrap())
        .map(|chunk| chunk.len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(source.next_chunk(2).unwrap().is_none());
}

#[test]
fn single_short_chunk_terminates_cleanly() {
    let mut source = RfArraySource::new(people(1), headers()).unwrap();
    let chunk = source.next_chunk(100).unwrap().unwrap();
    assert_eq!(chunk.len(), 1);
    assert!(source.next_chunk(100).unwrap().is_none());
}

#[test]
fn zero_chunk_size_is_rejected() {
    let mut source = RfArraySource::new(people(1), headers()).unwrap();
    assert!(matches!(
        source.next_chunk(0),
        Err(RfError::InvalidChunkSize(0))
    ));
}

struct SeqFetcher {
    total: u64,
}

impl RfPageFetcher for SeqFetcher {
    fn fetch_page(
        &mut self,
        _order: &RfOrdering,
        offset: u64,
        limit: usize,
    ) -> rowflow::Result<Vec<RfRow>> {
        let end = (offset + limit as u64).min(self.total);
        Ok((offset..end).map(|i| row(json!({"id": i}))).collect())
    }
}

#[test]
fn paged_source_yields_three_chunks_for_2500_rows() {
    let fetcher = SeqFetcher { total: 2500 };
    let shape = RfQueryShape {
        selected: vec!["id".to_string()],
        ..RfQueryShape::default()
    };
    let mut source = RfPagedSource::new(Box::new(fetcher), vec!["id".to_string()], shape);

    let mut sizes = Vec::new();
    let mut total = 0u64;
    while let Some(chunk) = source.next_chunk(1000).unwrap() {
        total += chunk.len() as u64;
        sizes.push(chunk.len());
    }
    assert_eq!(sizes, vec![1000, 1000, 500]);
    assert_eq!(total, 2500);
}

#[test]
fn paged_source_stops_after_short_page_without_refetching() {
    let fetcher = SeqFetcher { total: 3 };
    let shape = RfQueryShape {
        selected: vec!["id".to_string()],
        ..RfQueryShape::default()
    };
    let mut source = RfPagedSource::new(Box::new(fetcher), vec!["id".to_string()], shape);

    assert_eq!(source.next_chunk(10).unwrap().unwrap().len(), 3);
    assert!(source.next_chunk(10).unwrap().is_none());
    assert!(source.next_chunk(10).unwrap().is_none());
}

#[test]
fn declared_order_is_kept() {
    let shape = RfQueryShape {
        selected: vec!["a".to_string()],
        order_by: vec!["created_at".to_string(), "a".to_string()],
        ..RfQueryShape::default()
    };
    assert_eq!(
        shape.effective_order(),
        RfOrdering::Declared(vec!["created_at".to_string(), "a".to_string()])
    );
}

#[test]
fn order_injection_prefers_primary_key() {
    let shape = RfQueryShape {
        selected: vec!["name".to_string()],
        primary_key: Some("pk".to_string()),
        ..RfQueryShape::default()
    };
    assert_eq!(shape.effective_order(), RfOrdering::Key("pk".to_string()));
}

#[test]
fn order_injection_falls_back_to_id_like_column() {
    let shape = RfQueryShape {
        selected: vec!["name".to_string(), "account_id".to_string()],
        ..RfQueryShape::default()
    };
    assert_eq!(
        shape.effective_order(),
        RfOrdering::Key("account_id".to_string())
    );
}

#[test]
fn order_injection_falls_back_to_first_column_then_constant() {
    let shape = RfQueryShape {
        selected: vec!["name".to_string(), "rank".to_string()],
        ..RfQueryShape::default()
    };
    assert_eq!(shape.effective_order(), RfOrdering::Key("name".to_string()));

    let bare = RfQueryShape::default();
    assert_eq!(bare.effective_order(), RfOrdering::Constant);
}

#[test]
fn complexity_classification() {
    assert!(!RfQueryShape::default().is_complex());
    assert!(RfQueryShape {
        joins: 1,
        ..RfQueryShape::default()
    }
    .is_complex());
    assert!(RfQueryShape {
        has_grouping: true,
        ..RfQueryShape::default()
    }
    .is_complex());
    assert!(RfQueryShape {
        order_by: vec!["a".into(), "b".into(), "c".into()],
        ..RfQueryShape::default()
    }
    .is_complex());
}
