//! Dataset Model and Storage
//!
//! Three Thai legal codes, each stored as `{data_dir}/{code}.json` holding
//! `{ "<code>": [ <section>, ... ] }`. A section's `content` is either a flat
//! string (legacy shape) or an object with ordered `paragraphs`, each of which
//! may carry ordered `subsections`.
//!
//! Files are read fresh on every load; nothing here caches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::QueryError;

/// Prefix of the formatted section label ("มาตรา 1012")
pub const SECTION_LABEL_PREFIX: &str = "มาตรา";

// ============================================================================
// Dataset codes
// ============================================================================

/// Closed set of dataset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatasetCode {
    #[default]
    CivilAndCommercial,
    CivilProcedure,
    Criminal,
}

impl DatasetCode {
    pub const ALL: [DatasetCode; 3] = [
        DatasetCode::CivilAndCommercial,
        DatasetCode::CivilProcedure,
        DatasetCode::Criminal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetCode::CivilAndCommercial => "civil_and_commercial_code",
            DatasetCode::CivilProcedure => "civil_procedure_code",
            DatasetCode::Criminal => "criminal_code",
        }
    }

    /// Comma-separated list of every valid code, for error messages
    pub fn valid_codes() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Wrap a bare numeral in this dataset's section label convention
    ///
    /// All three codes label sections the same way.
    pub fn section_label(&self, numeral: &str) -> String {
        format!("{} {}", SECTION_LABEL_PREFIX, numeral)
    }
}

impl FromStr for DatasetCode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| QueryError::InvalidDataset {
                code: s.to_string(),
                valid: Self::valid_codes(),
            })
    }
}

impl fmt::Display for DatasetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Section, paragraph and subsection identifier
///
/// Older dataset versions store bare integers (`1012`), newer ones formatted
/// labels (`"มาตรา 1012"`). Both decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Identifier {
    /// Match a raw `filter_id` value
    ///
    /// True when the id loosely equals the raw value, equals the raw value
    /// wrapped in the dataset's label convention, or contains it as a substring.
    pub fn matches_filter(&self, raw: &str, code: DatasetCode) -> bool {
        let loose_eq = match self {
            Identifier::Number(n) => raw
                .trim()
                .parse::<f64>()
                .map_or(false, |v| v == *n as f64),
            Identifier::Text(s) => s == raw,
        };
        if loose_eq {
            return true;
        }

        if let Identifier::Text(s) = self {
            if *s == code.section_label(raw) {
                return true;
            }
        }

        self.to_string().contains(raw)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

/// One addressable legal provision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Identifier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Remaining source fields (`sections`, extracts, ...), echoed verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Section body: flat string or paragraph structure
///
/// Anything else decodes as `Other` and is treated as its JSON rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    PlainText(String),
    Structured(StructuredContent),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredContent {
    pub paragraphs: Vec<Paragraph>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Identifier>,

    /// Text node; `null` and missing both decode as `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsections: Option<Vec<Subsection>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Paragraph {
    /// `id` if present, else `number`
    pub fn label(&self) -> Option<&Identifier> {
        self.id.as_ref().or(self.number.as_ref())
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn subsections(&self) -> &[Subsection] {
        self.subsections.as_deref().unwrap_or_default()
    }
}

impl Subsection {
    pub fn label(&self) -> Option<&Identifier> {
        self.id.as_ref().or(self.number.as_ref())
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl Content {
    /// Case-insensitive search through every text node
    ///
    /// Structured content matches when any paragraph or any of its
    /// subsections contains the needle. Missing text nodes never match.
    /// `needle_lower` must be lower-cased.
    pub fn contains_ci(&self, needle_lower: &str) -> bool {
        use crate::utils::contains_ci;

        let node_matches =
            |text: Option<&str>| text.map_or(false, |t| contains_ci(t, needle_lower));

        match self {
            Content::PlainText(text) => contains_ci(text, needle_lower),
            Content::Structured(s) => s.paragraphs.iter().any(|p| {
                node_matches(p.text()) || p.subsections().iter().any(|sub| node_matches(sub.text()))
            }),
            Content::Other(value) => contains_ci(&value_text(value), needle_lower),
        }
    }

    /// Flat text form
    ///
    /// Structured content becomes one line per paragraph followed by one line
    /// per subsection, in document order. Missing text nodes are skipped.
    pub fn flatten_text(&self) -> String {
        match self {
            Content::PlainText(text) => text.clone(),
            Content::Structured(s) => {
                let mut lines = Vec::new();
                for paragraph in &s.paragraphs {
                    lines.extend(paragraph.text());
                    lines.extend(paragraph.subsections().iter().filter_map(Subsection::text));
                }
                lines.join("\n")
            }
            Content::Other(value) => value_text(value),
        }
    }
}

/// String coercion for arbitrary JSON values (strings unquoted)
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Read-only, file-backed dataset source
#[derive(Debug, Clone)]
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, code: DatasetCode) -> PathBuf {
        self.data_dir.join(format!("{}.json", code))
    }

    /// Full file contents, unparsed
    pub fn raw(&self, code: DatasetCode) -> Result<Vec<u8>, QueryError> {
        let path = self.path_for(code);
        std::fs::read(&path).map_err(|e| {
            QueryError::malformed(
                code.as_str(),
                format!("failed to read {}: {}", path.display(), e),
            )
        })
    }

    /// Load and decode every section of a dataset, in file order
    pub fn load(&self, code: DatasetCode) -> Result<Vec<Section>, QueryError> {
        let bytes = self.raw(code)?;

        let mut document: Value = serde_json::from_slice(&bytes).map_err(|e| {
            QueryError::malformed(code.as_str(), format!("invalid JSON: {}", e))
        })?;

        let items = match document.get_mut(code.as_str()).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(QueryError::malformed(
                    code.as_str(),
                    format!("'{}' is not an array", code),
                ))
            }
            None => {
                return Err(QueryError::malformed(
                    code.as_str(),
                    format!("missing top-level '{}' key", code),
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value(item).map_err(|e| {
                    QueryError::malformed(code.as_str(), format!("item {}: {}", idx, e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured_section() -> Section {
        serde_json::from_value(json!({
            "id": 3,
            "title": "Jurisdiction",
            "content": {
                "paragraphs": [
                    { "id": "1", "content": "First paragraph", "subsections": [] },
                    {
                        "number": "2",
                        "content": "Second paragraph",
                        "subsections": [
                            { "number": "ก", "content": "Subsection Alpha" },
                            { "id": "ข", "content": "Subsection Beta" }
                        ]
                    }
                ]
            },
            "sections": { "introduction": "intro" }
        }))
        .unwrap()
    }

    #[test]
    fn test_dataset_code_round_trip() {
        for code in DatasetCode::ALL {
            assert_eq!(code.as_str().parse::<DatasetCode>().unwrap(), code);
        }
        assert_eq!(DatasetCode::default(), DatasetCode::CivilAndCommercial);
    }

    #[test]
    fn test_invalid_code_lists_valid_codes() {
        let err = "invalid_code".parse::<DatasetCode>().unwrap_err();
        let msg = err.to_string();
        assert!(err.is_client_error());
        assert_eq!(err.code(), "invalid_code");
        for code in DatasetCode::ALL {
            assert!(msg.contains(code.as_str()), "message should name {}", code);
        }
    }

    #[test]
    fn test_content_shapes_decode() {
        let plain: Section = serde_json::from_value(json!({
            "id": "มาตรา 1012", "title": "Partnership", "content": "flat text"
        }))
        .unwrap();
        assert!(matches!(plain.content, Some(Content::PlainText(_))));
        assert_eq!(plain.id, Identifier::Text("มาตรา 1012".to_string()));

        let structured = structured_section();
        match &structured.content {
            Some(Content::Structured(s)) => {
                assert_eq!(s.paragraphs.len(), 2);
                assert_eq!(s.paragraphs[1].label(), Some(&Identifier::Text("2".to_string())));
                assert_eq!(s.paragraphs[1].subsections().len(), 2);
            }
            other => panic!("expected structured content, got {:?}", other),
        }
        assert!(structured.extra.contains_key("sections"));

        let other: Section =
            serde_json::from_value(json!({ "id": 1, "title": "t", "content": 42 })).unwrap();
        assert!(matches!(other.content, Some(Content::Other(_))));
    }

    #[test]
    fn test_section_serializes_extra_fields_back() {
        let section = structured_section();
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["id"], json!(3));
        assert_eq!(value["sections"]["introduction"], json!("intro"));
        assert_eq!(value["content"]["paragraphs"][1]["subsections"][0]["number"], json!("ก"));
    }

    #[test]
    fn test_structured_search_reaches_subsections() {
        let section = structured_section();
        let content = section.content.as_ref().unwrap();
        assert!(content.contains_ci("first paragraph"));
        assert!(content.contains_ci("beta"));
        assert!(!content.contains_ci("gamma"));
    }

    #[test]
    fn test_structured_search_superset_of_flat_search() {
        let content = structured_section().content.unwrap();
        let flat = Content::PlainText(content.flatten_text());
        for needle in ["second", "alpha", "paragraph", "subsection beta"] {
            if flat.contains_ci(needle) {
                assert!(content.contains_ci(needle), "structured search missed '{}'", needle);
            }
        }
    }

    #[test]
    fn test_flatten_text_preserves_order() {
        let content = structured_section().content.unwrap();
        assert_eq!(
            content.flatten_text(),
            "First paragraph\nSecond paragraph\nSubsection Alpha\nSubsection Beta"
        );
    }

    #[test]
    fn test_identifier_filter_matching() {
        let code = DatasetCode::CivilAndCommercial;
        let label = Identifier::Text("มาตรา 1012".to_string());
        let bare = Identifier::Number(1012);

        assert!(label.matches_filter("1012", code));
        assert!(label.matches_filter("มาตรา 1012", code));
        assert!(bare.matches_filter("1012", code));
        assert!(bare.matches_filter(" 1012 ", code));
        // Substring containment
        assert!(bare.matches_filter("101", code));
        assert!(!bare.matches_filter("1013", code));
        assert!(!label.matches_filter("2000", code));
    }

    #[test]
    fn test_null_text_nodes_keep_content_structured() {
        let section: Section = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "content": {
                "paragraphs": [
                    { "id": "1", "content": "hello", "subsections": [{ "id": "1", "content": null }] },
                    { "id": "2", "content": null, "subsections": [{ "id": "ก", "content": "world" }] },
                    { "id": "3" }
                ]
            }
        }))
        .unwrap();

        let content = section.content.as_ref().unwrap();
        match content {
            Content::Structured(s) => {
                assert_eq!(s.paragraphs.len(), 3);
                assert_eq!(s.paragraphs[0].subsections()[0].text(), None);
                assert_eq!(s.paragraphs[2].text(), None);
            }
            other => panic!("expected structured content, got {:?}", other),
        }

        assert!(content.contains_ci("hello"));
        assert!(content.contains_ci("world"));
        // Structural key names are not text
        assert!(!content.contains_ci("paragraphs"));
        assert!(!content.contains_ci("null"));
        assert_eq!(content.flatten_text(), "hello\nworld");
    }

    #[test]
    fn test_store_load_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());

        // Missing file
        let err = store.load(DatasetCode::Criminal).unwrap_err();
        assert!(matches!(err, QueryError::MalformedSource { .. }));

        // Wrong top-level key
        std::fs::write(store.path_for(DatasetCode::Criminal), r#"{"other": []}"#).unwrap();
        let err = store.load(DatasetCode::Criminal).unwrap_err();
        assert_eq!(err.code(), "criminal_code");
        assert!(err.to_string().contains("missing top-level"));

        // Not an array
        std::fs::write(store.path_for(DatasetCode::Criminal), r#"{"criminal_code": {}}"#)
            .unwrap();
        assert!(store.load(DatasetCode::Criminal).is_err());

        // Valid
        std::fs::write(
            store.path_for(DatasetCode::Criminal),
            r#"{"criminal_code": [{"id": 1, "title": "a", "content": "x"}, {"id": 2, "title": "b", "content": "y"}]}"#,
        )
        .unwrap();
        let sections = store.load(DatasetCode::Criminal).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].id, Identifier::Number(2));
    }
}
