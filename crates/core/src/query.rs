//! Sort and search over cached snapshots.
//!
//! ### Semantics
//! - Sort: stable, lexical on the string form of a (possibly dotted) field.
//!   Items missing the field sort after all others in ascending order.
//! - Search: case-insensitive substring match against every top-level field.
//! - Composition: sort first, then search. Pagination is never reapplied here;
//!   whatever slice the snapshot holds is returned in full.
//!
//! All transforms work on owned copies. The cached snapshot is never touched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Snapshot;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Only the exact string `desc` sorts descending; anything else is ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "desc" { Ok(SortOrder::Desc) } else { Ok(SortOrder::Asc) }
    }
}

/// Request-scoped query parameters for a collection read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// 1-based page number (default 1).
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size (default 10).
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,

    /// Field to sort by; dotted paths reach into nested objects.
    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default, deserialize_with = "lenient_order")]
    pub order: SortOrder,

    /// Case-insensitive substring filter.
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_items_per_page() -> u32 {
    10
}

fn lenient_order<'de, D>(deserializer: D) -> Result<SortOrder, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: default_page(),
            items_per_page: default_items_per_page(),
            sort: None,
            order: SortOrder::Asc,
            search: None,
        }
    }
}

impl QuerySpec {
    /// Upstream offset for this page: `(page - 1) * items_per_page`.
    ///
    /// A page of 0 is treated as the first page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.items_per_page)
    }
}

/// Sort `items` by `field`.
///
/// The sort is stable in both directions: descending reverses the comparison,
/// not the output, so ties keep their input order.
pub fn apply_sort(items: Vec<Value>, field: &str, order: SortOrder) -> Vec<Value> {
    let mut keyed: Vec<(Option<String>, Value)> =
        items.into_iter().map(|item| (lookup(&item, field).map(stringify), item)).collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_keys(a.as_deref(), b.as_deref());
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Keep items where any top-level field contains `term`, case-insensitively.
pub fn apply_search(items: Vec<Value>, term: &str) -> Vec<Value> {
    let needle = term.to_lowercase();
    items.into_iter().filter(|item| matches_term(item, &needle)).collect()
}

/// Apply a query to a cached snapshot, producing a new view.
///
/// Only `sort`, `order` and `search` are honored; `page` and
/// `items_per_page` are ignored because the snapshot may already be a single
/// page. Envelope fields are returned as cached.
pub fn apply_query(snapshot: &Snapshot, spec: &QuerySpec) -> Snapshot {
    let mut view = snapshot.clone();

    if let Some(field) = spec.sort.as_deref() {
        view.map_results(|items| apply_sort(items, field, spec.order));
    }
    if let Some(term) = spec.search.as_deref() {
        view.map_results(|items| apply_search(items, term));
    }

    view
}

/// String form used for both comparison and matching.
///
/// Arrays join their elements with `,`; objects render as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { stringify(item) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Resolve a dotted field path against an item.
fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = item.get(path) {
        return Some(direct);
    }
    path.split('.').try_fold(item, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn compare_keys(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches_term(item: &Value, needle: &str) -> bool {
    match item {
        Value::Object(map) => map.values().any(|value| stringify(value).to_lowercase().contains(needle)),
        other => stringify(other).to_lowercase().contains(needle),
    }
}
