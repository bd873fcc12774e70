//! voltdesk query: pure list evaluation over record snapshots.
//!
//! One function, no state: take the full record set plus a query (search
//! text, search fields, equality filter, page, page size) and produce the
//! visible slice with pagination metadata. The caller owns "current page"
//! and "current filter" and re-runs the query on every change; the engine
//! never mutates records and retains nothing between calls.

#![forbid(unsafe_code)]

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voltdesk_core::Record;

/// Sentinel filter value meaning "no filtering" (case-insensitive), the
/// default option of every filter dropdown.
pub const FILTER_ALL: &str = "all";

/// Single-dimension equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), value: value.into() }
    }

    fn is_all(&self) -> bool {
        self.value.eq_ignore_ascii_case(FILTER_ALL)
    }
}

/// What subset of records to show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    /// Free text matched (case-insensitive substring) against
    /// `search_fields`. Empty means "no search".
    #[serde(default)]
    pub search_text: String,
    pub search_fields: Vec<String>,
    #[serde(default)]
    pub filter: Option<Filter>,
    /// 1-based; out-of-range values are clamped, never an error.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            search_fields: Vec::new(),
            filter: None,
            page: 1,
            page_size: 10,
        }
    }
}

/// Per-stage survivor counts, for `--explain` output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListDebugInfo {
    pub total: usize,
    pub after_filter: usize,
    pub after_search: usize,
}

/// One page of results, borrowing from the snapshot, in source order.
#[derive(Debug)]
pub struct ListPage<'a, T> {
    pub items: Vec<&'a T>,
    pub total_matching: usize,
    /// Never 0: an empty result is one empty page.
    pub total_pages: usize,
    /// The effective (clamped) page actually returned.
    pub page: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("configuration: {0}")]
    Configuration(String),
}

/// Evaluate a query against a snapshot of records.
pub fn run<'a, T: Record>(records: &'a [T], q: &ListQuery) -> Result<ListPage<'a, T>, QueryError> {
    run_with_debug(records, q).map(|(page, _dbg)| page)
}

/// Like [`run`], additionally reporting per-stage counts.
pub fn run_with_debug<'a, T: Record>(
    records: &'a [T],
    q: &ListQuery,
) -> Result<(ListPage<'a, T>, ListDebugInfo), QueryError> {
    let started = Instant::now();
    if q.page_size == 0 {
        return Err(QueryError::Configuration("page_size must be positive".into()));
    }

    let filter = q.filter.as_ref().filter(|f| !f.is_all());
    let needle = if q.search_text.is_empty() {
        None
    } else {
        Some(q.search_text.to_ascii_lowercase())
    };

    // Filter and search are independent predicates; a single ANDed pass
    // keeps them trivially commutative and order-preserving.
    let mut after_filter = 0usize;
    let mut matching: Vec<&T> = Vec::new();
    for rec in records {
        if let Some(f) = filter {
            let ok = rec.field(&f.field).map(|v| v.matches_literal(&f.value)).unwrap_or(false);
            if !ok {
                continue;
            }
        }
        after_filter += 1;
        if let Some(needle) = needle.as_deref() {
            let ok = q
                .search_fields
                .iter()
                .any(|name| rec.field(name).map(|v| v.contains_text(needle)).unwrap_or(false));
            if !ok {
                continue;
            }
        }
        matching.push(rec);
    }

    let total_matching = matching.len();
    let total_pages = total_matching.div_ceil(q.page_size).max(1);
    let page = q.page.clamp(1, total_pages);
    let start = (page - 1) * q.page_size;
    let items: Vec<&T> = matching.into_iter().skip(start).take(q.page_size).collect();

    metrics::histogram!("list_matches", total_matching as f64);
    metrics::histogram!("list_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
    debug!(
        total = records.len(),
        after_filter,
        matched = total_matching,
        page,
        "list query evaluated"
    );

    let dbg = ListDebugInfo {
        total: records.len(),
        after_filter,
        after_search: total_matching,
    };
    Ok((ListPage { items, total_matching, total_pages, page }, dbg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltdesk_core::{FieldValue, Uid};

    #[derive(Debug)]
    struct Part {
        uid: Uid,
        name: String,
        stock: i64,
        status: String,
    }

    impl Record for Part {
        fn uid(&self) -> Uid {
            self.uid
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::Str(&self.name)),
                "stock" => Some(FieldValue::Num(self.stock as f64)),
                "status" => Some(FieldValue::Str(&self.status)),
                _ => None,
            }
        }
    }

    fn part(name: &str, stock: i64, status: &str) -> Part {
        Part { uid: Uid::new(), name: name.to_string(), stock, status: status.to_string() }
    }

    fn q(search: &str, page: usize, page_size: usize) -> ListQuery {
        ListQuery {
            search_text: search.to_string(),
            search_fields: vec!["name".to_string()],
            filter: None,
            page,
            page_size,
        }
    }

    #[test]
    fn search_matches_case_insensitive_substring() {
        let parts = vec![part("Front Wheel Bearing", 5, "Active"), part("Oil Filter", 2, "Active")];
        let page = run(&parts, &q("front", 1, 10)).unwrap();
        assert_eq!(page.total_matching, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items[0].name, "Front Wheel Bearing");
    }

    #[test]
    fn empty_query_matches_everything() {
        let parts: Vec<Part> = (0..7).map(|i| part(&format!("p{i}"), i, "Active")).collect();
        let page = run(&parts, &q("", 1, 10)).unwrap();
        assert_eq!(page.total_matching, 7);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let parts: Vec<Part> = (0..25).map(|i| part(&format!("p{i}"), i, "Active")).collect();
        let page = run(&parts, &q("", 3, 10)).unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn filter_is_case_insensitive_equality() {
        let parts = vec![
            part("a", 0, "Active"),
            part("b", 0, "Retired"),
            part("c", 0, "Active"),
            part("d", 0, "Pending"),
            part("e", 0, "Active"),
        ];
        for value in ["Active", "active"] {
            let query = ListQuery {
                filter: Some(Filter::new("status", value)),
                ..q("", 1, 10)
            };
            let page = run(&parts, &query).unwrap();
            assert_eq!(page.total_matching, 3, "value={value}");
        }
    }

    #[test]
    fn all_sentinel_disables_the_filter() {
        let parts = vec![part("a", 0, "Active"), part("b", 0, "Retired")];
        let query = ListQuery { filter: Some(Filter::new("status", "All")), ..q("", 1, 10) };
        assert_eq!(run(&parts, &query).unwrap().total_matching, 2);
    }

    #[test]
    fn numeric_filter_compares_parsed_values() {
        let parts = vec![part("a", 5, "Active"), part("b", 12, "Active")];
        let query = ListQuery { filter: Some(Filter::new("stock", "12")), ..q("", 1, 10) };
        let page = run(&parts, &query).unwrap();
        assert_eq!(page.total_matching, 1);
        assert_eq!(page.items[0].name, "b");
    }

    #[test]
    fn numeric_fields_do_not_participate_in_text_search() {
        let parts = vec![part("a", 55, "Active")];
        let query = ListQuery {
            search_text: "55".to_string(),
            search_fields: vec!["name".to_string(), "stock".to_string()],
            ..q("", 1, 10)
        };
        assert_eq!(run(&parts, &query).unwrap().total_matching, 0);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let parts: Vec<Part> = (0..25).map(|i| part(&format!("p{i}"), i, "Active")).collect();
        let page = run(&parts, &q("", 999_999, 10)).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 5);
        // page 0 clamps up to 1
        let first = run(&parts, &q("", 0, 10)).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);
    }

    #[test]
    fn empty_result_is_one_empty_page() {
        let parts: Vec<Part> = Vec::new();
        let page = run(&parts, &q("", 1, 10)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_matching, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn zero_page_size_is_a_configuration_error() {
        let parts = vec![part("a", 0, "Active")];
        let err = run(&parts, &q("", 1, 0)).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn source_order_is_preserved() {
        let parts = vec![
            part("zeta front", 0, "Active"),
            part("alpha front", 0, "Active"),
            part("mid front", 0, "Active"),
        ];
        let page = run(&parts, &q("front", 1, 10)).unwrap();
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["zeta front", "alpha front", "mid front"]);
    }

    #[test]
    fn unknown_fields_never_match() {
        let parts = vec![part("a", 0, "Active")];
        let query = ListQuery {
            search_text: "a".to_string(),
            search_fields: vec!["color".to_string()],
            ..q("", 1, 10)
        };
        assert_eq!(run(&parts, &query).unwrap().total_matching, 0);
        let query = ListQuery { filter: Some(Filter::new("color", "red")), ..q("", 1, 10) };
        assert_eq!(run(&parts, &query).unwrap().total_matching, 0);
    }

    #[test]
    fn debug_counts_track_each_stage() {
        let parts = vec![
            part("front brake", 0, "Active"),
            part("front light", 0, "Retired"),
            part("rear brake", 0, "Active"),
        ];
        let query = ListQuery {
            search_text: "front".to_string(),
            search_fields: vec!["name".to_string()],
            filter: Some(Filter::new("status", "Active")),
            page: 1,
            page_size: 10,
        };
        let (page, dbg) = run_with_debug(&parts, &query).unwrap();
        assert_eq!(dbg.total, 3);
        assert_eq!(dbg.after_filter, 2);
        assert_eq!(dbg.after_search, 1);
        assert_eq!(page.items[0].name, "front brake");
    }
}
