// Query Engine
//
// Purpose: filter / search / sort / paginate pipeline over one legal-code dataset
// Stage order is fixed: load → filter_id → filter_title → filter_content → search → sort → page
// Every stage is optional and only ever narrows the working set.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::dataset::{value_text, DatasetCode, DatasetStore, Identifier, Section};
use crate::error::QueryError;
use crate::utils::{contains_ci, parse_leading_int};

pub const DEFAULT_SORT_FIELD: &str = "id";

/// Query parameters as they arrive on the query string
///
/// Everything stays a string until the pipeline interprets it, so malformed
/// numbers degrade to defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LawQuery {
    pub code: Option<String>,
    pub filter_id: Option<String>,
    pub filter_title: Option<String>,
    pub filter_content: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl LawQuery {
    /// Requested dataset, defaulting to the first known code
    pub fn dataset_code(&self) -> Result<DatasetCode, QueryError> {
        match self.code.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(DatasetCode::default()),
        }
    }

    pub fn sort_field(&self) -> Option<&str> {
        match self.sort.as_deref() {
            Some(field) => non_empty(field),
            None => Some(DEFAULT_SORT_FIELD),
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        match self.order.as_deref() {
            None | Some("") => SortOrder::Asc,
            Some(o) if o.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    /// Pagination window; non-numeric input falls back to the defaults
    pub fn window(&self) -> PageWindow {
        let offset = self
            .offset
            .as_deref()
            .and_then(parse_leading_int)
            .map(clamp_to_usize)
            .unwrap_or(0);
        let limit = self
            .limit
            .as_deref()
            .and_then(non_empty)
            .and_then(parse_leading_int)
            .map(clamp_to_usize);
        PageWindow { offset, limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    /// `None` means no limit
    pub limit: Option<usize>,
}

/// Response wrapper
///
/// `total` counts matches before pagination, `count` the sections on this page.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub code: String,
    pub total: usize,
    pub offset: usize,
    pub limit: Option<usize>,
    pub count: usize,
    pub data: Vec<Section>,
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: DatasetStore,
}

impl QueryEngine {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Load the requested dataset and run the full pipeline over it
    pub fn execute(&self, query: &LawQuery) -> Result<Envelope, QueryError> {
        let code = query.dataset_code()?;
        let start = Instant::now();

        let sections = self.store.load(code)?;
        let loaded = sections.len();
        let envelope = run_pipeline(code, sections, query);

        tracing::debug!(
            "Query on {} matched {}/{} sections, returned {} in {:?}",
            code,
            envelope.total,
            loaded,
            envelope.count,
            start.elapsed()
        );

        Ok(envelope)
    }

    /// Filter, search and sort without paginating
    pub fn matching_sections(
        &self,
        query: &LawQuery,
    ) -> Result<(DatasetCode, Vec<Section>), QueryError> {
        let code = query.dataset_code()?;
        let sections = self.store.load(code)?;
        Ok((code, filter_and_sort(code, sections, query)))
    }
}

/// Pure pipeline over already-loaded sections
pub fn run_pipeline(code: DatasetCode, sections: Vec<Section>, query: &LawQuery) -> Envelope {
    let items = filter_and_sort(code, sections, query);
    let total = items.len();
    let window = query.window();

    // Without a limit the window is not applied at all, offset included
    let data: Vec<Section> = match window.limit {
        Some(limit) => items.into_iter().skip(window.offset).take(limit).collect(),
        None => items,
    };

    Envelope {
        code: code.to_string(),
        total,
        offset: window.offset,
        limit: window.limit,
        count: data.len(),
        data,
    }
}

fn filter_and_sort(code: DatasetCode, sections: Vec<Section>, query: &LawQuery) -> Vec<Section> {
    let mut items = sections;

    if let Some(raw) = query.filter_id.as_deref().and_then(non_empty) {
        items.retain(|s| s.id.matches_filter(raw, code));
    }

    if let Some(title) = query.filter_title.as_deref().and_then(non_empty) {
        let needle = title.to_lowercase();
        items.retain(|s| title_matches(s, &needle));
    }

    if let Some(text) = query.filter_content.as_deref().and_then(non_empty) {
        let needle = text.to_lowercase();
        items.retain(|s| content_matches(s, &needle));
    }

    if let Some(term) = query.search.as_deref().and_then(non_empty) {
        let needle = term.to_lowercase();
        items.retain(|s| {
            title_matches(s, &needle)
                || content_matches(s, &needle)
                || contains_ci(&s.id.to_string(), &needle)
        });
    }

    if let Some(field) = query.sort_field() {
        sort_sections(&mut items, field, query.sort_order());
    }

    items
}

fn title_matches(section: &Section, needle_lower: &str) -> bool {
    section
        .title
        .as_deref()
        .map_or(false, |t| contains_ci(t, needle_lower))
}

fn content_matches(section: &Section, needle_lower: &str) -> bool {
    section
        .content
        .as_ref()
        .map_or(false, |c| c.contains_ci(needle_lower))
}

// ============================================================================
// Sorting
// ============================================================================

/// Extracted sort value: lower-cased text form plus numeric form if there is one
#[derive(Debug, Clone, PartialEq)]
struct SortKey {
    number: Option<f64>,
    text: String,
}

impl SortKey {
    fn text(text: &str) -> Self {
        Self {
            number: None,
            text: text.to_lowercase(),
        }
    }

    fn number(n: f64, rendered: String) -> Self {
        Self {
            number: Some(n),
            text: rendered.to_lowercase(),
        }
    }
}

fn sort_key(section: &Section, field: &str) -> Option<SortKey> {
    match field {
        "id" => Some(match &section.id {
            Identifier::Number(n) => SortKey::number(*n as f64, n.to_string()),
            Identifier::Text(s) => SortKey::text(s),
        }),
        "title" => section.title.as_deref().map(SortKey::text),
        "content" => section.content.as_ref().map(|c| SortKey::text(&c.flatten_text())),
        other => match section.extra.get(other)? {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => Some(match n.as_f64() {
                Some(f) => SortKey::number(f, n.to_string()),
                None => SortKey::text(&n.to_string()),
            }),
            value => Some(SortKey::text(&value_text(value))),
        },
    }
}

/// Stable sort by one field; sections lacking the field always go last
///
/// Keys compare numerically only when every present key is a number,
/// otherwise all keys compare as lower-cased text. Either way the comparator
/// is a total order.
pub fn sort_sections(items: &mut Vec<Section>, field: &str, order: SortOrder) {
    if items.len() < 2 {
        return;
    }

    let mut keyed: Vec<(Option<SortKey>, Section)> = items
        .drain(..)
        .map(|s| (sort_key(&s, field), s))
        .collect();

    let numeric = keyed
        .iter()
        .filter_map(|(k, _)| k.as_ref())
        .all(|k| k.number.is_some());

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = match (numeric, a.number, b.number) {
                (true, Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.text.cmp(&b.text),
            };
            order.apply(ord)
        }
    });

    items.extend(keyed.into_iter().map(|(_, s)| s));
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn clamp_to_usize(v: i64) -> usize {
    usize::try_from(v.max(0)).unwrap_or(usize::MAX)
}
