//! Canonical query-string construction.
//!
//! [`build_query`] turns an ordered parameter mapping into a URL query string:
//!
//! - `Null` values are dropped entirely
//! - empty strings are dropped when `skip_empty_string` is set (default)
//! - booleans render as `true` / `false`
//! - dates render with a configurable format (default `YYYY-MM-DD`)
//! - lists render as repeated keys (`k=a&k=b`, default) or comma-joined (`k=a,b`)
//! - a list that is empty after filtering contributes nothing
//!
//! ```rust
//! use walletdesk_core::query::{build_query, BuildQueryOptions, QueryParams};
//!
//! let params = QueryParams::new()
//!     .with("search", "ana")
//!     .with("status", "all")
//!     .with("page", 1);
//!
//! assert_eq!(
//!     build_query(&params, &BuildQueryOptions::default()),
//!     "?search=ana&status=all&page=1"
//! );
//! ```

use time::format_description::{self, OwnedFormatItem};
use time::macros::format_description as fd;
use time::{Date, OffsetDateTime};

use crate::error::ValidationError;

/// How list values are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayStyle {
    /// `k=a&k=b`
    #[default]
    Repeat,
    /// `k=a,b`
    Comma,
}

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    List(Vec<QueryValue>),
}

impl QueryValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn render(&self, date_format: &DateFormat) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::Text(value) => vec![value.clone()],
            Self::Integer(value) => vec![value.to_string()],
            Self::Float(value) => vec![value.to_string()],
            Self::Bool(value) => vec![if *value { "true" } else { "false" }.to_owned()],
            Self::Date(value) => vec![date_format.format_date(*value)],
            Self::DateTime(value) => vec![date_format.format_datetime(*value)],
            Self::List(values) => {
                // a nested list renders as one comma-joined element
                let joined = values
                    .iter()
                    .flat_map(|value| value.render(date_format))
                    .collect::<Vec<_>>()
                    .join(",");
                vec![joined]
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Date> for QueryValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<OffsetDateTime> for QueryValue {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

macro_rules! integer_query_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered parameter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping the position of an existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Parsed date format description.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    items: Option<OwnedFormatItem>,
}

impl DateFormat {
    /// Parses a `time` format description, e.g. `[day].[month].[year]`.
    pub fn parse(description: &str) -> Result<Self, ValidationError> {
        let items = format_description::parse_owned::<2>(description).map_err(|_| {
            ValidationError::InvalidDateFormat {
                value: description.to_owned(),
            }
        })?;

        Ok(Self { items: Some(items) })
    }

    fn format_date(&self, value: Date) -> String {
        self.items
            .as_ref()
            .and_then(|items| value.format(items).ok())
            .unwrap_or_else(|| iso_date(value))
    }

    fn format_datetime(&self, value: OffsetDateTime) -> String {
        self.items
            .as_ref()
            .and_then(|items| value.format(items).ok())
            .unwrap_or_else(|| iso_date(value.date()))
    }
}

impl Default for DateFormat {
    /// `YYYY-MM-DD`.
    fn default() -> Self {
        Self { items: None }
    }
}

fn iso_date(value: Date) -> String {
    value
        .format(fd!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

/// Options for [`build_query`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildQueryOptions {
    pub with_prefix: bool,
    pub skip_empty_string: bool,
    pub array_style: ArrayStyle,
    pub date_format: DateFormat,
}

impl Default for BuildQueryOptions {
    fn default() -> Self {
        Self {
            with_prefix: true,
            skip_empty_string: true,
            array_style: ArrayStyle::Repeat,
            date_format: DateFormat::default(),
        }
    }
}

impl BuildQueryOptions {
    pub fn bare() -> Self {
        Self {
            with_prefix: false,
            ..Self::default()
        }
    }

    pub fn with_array_style(mut self, array_style: ArrayStyle) -> Self {
        self.array_style = array_style;
        self
    }

    pub fn with_skip_empty_string(mut self, skip_empty_string: bool) -> Self {
        self.skip_empty_string = skip_empty_string;
        self
    }

    pub fn with_date_format(mut self, description: &str) -> Result<Self, ValidationError> {
        self.date_format = DateFormat::parse(description)?;
        Ok(self)
    }
}

/// Builds a form-encoded query string from `params`.
pub fn build_query(params: &QueryParams, options: &BuildQueryOptions) -> String {
    let mut pairs: Vec<String> = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        let values: Vec<String> = match value {
            QueryValue::List(items) => items
                .iter()
                .flat_map(|item| item.render(&options.date_format))
                .filter(|item| !(options.skip_empty_string && item.is_empty()))
                .collect(),
            scalar => scalar
                .render(&options.date_format)
                .into_iter()
                .filter(|item| !(options.skip_empty_string && item.is_empty()))
                .collect(),
        };

        if values.is_empty() {
            continue;
        }

        let encoded_key = encode_component(key);
        match (value, options.array_style) {
            (QueryValue::List(_), ArrayStyle::Comma) => {
                let joined = values
                    .iter()
                    .map(|item| encode_component(item))
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.push(format!("{encoded_key}={joined}"));
            }
            _ => {
                for item in &values {
                    pairs.push(format!("{encoded_key}={}", encode_component(item)));
                }
            }
        }
    }

    let query = pairs.join("&");
    if options.with_prefix && !query.is_empty() {
        format!("?{query}")
    } else {
        query
    }
}

fn encode_component(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn keeps_sentinel_values_and_insertion_order() {
        let params = QueryParams::new()
            .with("search", "ana")
            .with("status", "all")
            .with("page", 1);

        let query = build_query(&params, &BuildQueryOptions::default());
        assert_eq!(query, "?search=ana&status=all&page=1");
    }

    #[test]
    fn drops_null_and_empty_values() {
        let params = QueryParams::new()
            .with("search", "")
            .with("status", Option::<String>::None)
            .with("page", 2);

        assert_eq!(build_query(&params, &BuildQueryOptions::default()), "?page=2");
    }

    #[test]
    fn keeps_empty_strings_when_asked() {
        let params = QueryParams::new().with("search", "");
        let options = BuildQueryOptions::bare().with_skip_empty_string(false);

        assert_eq!(build_query(&params, &options), "search=");
    }

    #[test]
    fn comma_style_joins_and_drops_empty_lists() {
        let params = QueryParams::new()
            .with("tags", vec!["a", "b"])
            .with("tags2", Vec::<String>::new());
        let options = BuildQueryOptions::default().with_array_style(ArrayStyle::Comma);

        assert_eq!(build_query(&params, &options), "?tags=a,b");
    }

    #[test]
    fn repeat_style_emits_one_pair_per_item() {
        let params = QueryParams::new().with("id", vec!["1", "", "3"]);

        assert_eq!(
            build_query(&params, &BuildQueryOptions::default()),
            "?id=1&id=3"
        );
    }

    #[test]
    fn list_of_only_empty_strings_is_dropped() {
        let params = QueryParams::new().with("id", vec!["", ""]).with("page", 1);

        assert_eq!(build_query(&params, &BuildQueryOptions::default()), "?page=1");
    }

    #[test]
    fn booleans_and_dates_render_canonically() {
        let params = QueryParams::new()
            .with("isActive", false)
            .with("from", date!(2024 - 03 - 09))
            .with("to", datetime!(2024-03-10 23:15 UTC));

        assert_eq!(
            build_query(&params, &BuildQueryOptions::bare()),
            "isActive=false&from=2024-03-09&to=2024-03-10"
        );
    }

    #[test]
    fn custom_date_format_is_applied() {
        let params = QueryParams::new().with("from", date!(2024 - 03 - 09));
        let options = BuildQueryOptions::bare()
            .with_date_format("[day].[month].[year]")
            .expect("format should parse");

        assert_eq!(build_query(&params, &options), "from=09.03.2024");
    }

    #[test]
    fn rejects_invalid_date_format() {
        let err = BuildQueryOptions::default()
            .with_date_format("[nonsense")
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDateFormat { .. }));
    }

    #[test]
    fn encodes_reserved_characters() {
        let params = QueryParams::new().with("search", "ana maria&co");

        assert_eq!(
            build_query(&params, &BuildQueryOptions::bare()),
            "search=ana+maria%26co"
        );
    }

    #[test]
    fn empty_params_produce_empty_string_even_with_prefix() {
        assert_eq!(build_query(&QueryParams::new(), &BuildQueryOptions::default()), "");
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut params = QueryParams::new().with("page", 1).with("pageSize", 10);
        params.insert("page", 3);

        assert_eq!(
            build_query(&params, &BuildQueryOptions::bare()),
            "page=3&pageSize=10"
        );
    }
}
