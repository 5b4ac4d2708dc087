//! Paginated list normalization.
//!
//! Servers answer list endpoints in several shapes: an `{items, meta}`
//! envelope, a `{data, page, pageSize, total}` envelope with flat pagination
//! fields, or a bare array. [`normalize_paginated`] folds all of them into one
//! [`Paginated`] envelope and never fails.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FALLBACK_PAGE_SIZE: u64 = 10;

/// Pagination metadata of a normalized list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_count: u64,
}

/// Canonical paginated envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub total: u64,
    pub total_count: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        Self {
            items,
            meta: PageMeta {
                page,
                page_size,
                total,
                total_count: total,
            },
            total,
            total_count: total,
        }
    }

    pub fn empty(page: u64, page_size: u64) -> Self {
        Self::new(Vec::new(), page, page_size, 0)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
            total: self.total,
            total_count: self.total_count,
        }
    }
}

impl Paginated<Value> {
    /// Deserializes every item into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Paginated<T>, serde_json::Error> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(Paginated {
            items,
            meta: self.meta,
            total: self.total,
            total_count: self.total_count,
        })
    }
}

/// Caller-side defaults used when the payload carries no pagination fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageDefaults {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageDefaults {
    pub const fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}

/// Normalizes any list payload into a [`Paginated`] envelope.
///
/// Resolution order:
/// - `page`: `meta.page`, `meta.currentPage`, `page`, `currentPage`, defaults, `1`
/// - `pageSize`: `meta.pageSize`, `meta.page_size`, `pageSize`, `page_size`,
///   defaults, item count; a zero result becomes `10`
/// - `total`: `meta.total`, `meta.totalCount`, `total`, `totalCount`, item count
///
/// Negative or non-numeric counts are skipped in that order; fractional
/// counts truncate toward zero.
pub fn normalize_paginated(payload: &Value, defaults: PageDefaults) -> Paginated<Value> {
    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);

    let items = list_field(object, "items")
        .or_else(|| list_field(object, "data"))
        .or_else(|| payload.as_array().cloned())
        .unwrap_or_default();

    let meta = object
        .get("meta")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let item_count = items.len() as u64;

    let page = first_number(&[
        (meta, "page"),
        (meta, "currentPage"),
        (object, "page"),
        (object, "currentPage"),
    ])
    .or(defaults.page)
    .unwrap_or(1);

    let page_size = first_number(&[
        (meta, "pageSize"),
        (meta, "page_size"),
        (object, "pageSize"),
        (object, "page_size"),
    ])
    .or(defaults.page_size)
    .unwrap_or(item_count);

    let total = first_number(&[
        (meta, "total"),
        (meta, "totalCount"),
        (object, "total"),
        (object, "totalCount"),
    ])
    .unwrap_or(item_count);

    Paginated::new(
        items,
        if page == 0 { 1 } else { page },
        if page_size == 0 {
            FALLBACK_PAGE_SIZE
        } else {
            page_size
        },
        total,
    )
}

fn list_field(object: &Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    object.get(key).and_then(Value::as_array).cloned()
}

fn first_number(candidates: &[(&Map<String, Value>, &str)]) -> Option<u64> {
    candidates
        .iter()
        .find_map(|(object, key)| object.get(*key).and_then(as_count))
}

/// Reads a count as `u64`. Negative numbers and non-numeric strings count as
/// absent, so the next candidate field or default applies. Fractional numbers
/// are truncated toward zero.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}
