//! View Models for the browser UI
//!
//! Pagination is a pure function of (items, page size, page index); the
//! caller owns the current page and calls `render_page` again on every
//! navigation. Nothing here keeps state between requests.

use serde::Serialize;

use crate::dataset::{Content, Section};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page-size choices offered by the UI
pub const PAGE_SIZE_CHOICES: [usize; 4] = [10, 20, 50, 100];

const TAB_REPLACEMENT: &str = "\u{a0}\u{a0}\u{a0}\u{a0}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageSize {
    Fixed(usize),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Fixed(DEFAULT_PAGE_SIZE)
    }
}

impl PageSize {
    /// "all" or a positive integer; anything else gives the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("all") => PageSize::All,
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => PageSize::Fixed(n),
                _ => PageSize::default(),
            },
            None => PageSize::default(),
        }
    }

    pub fn as_param(&self) -> String {
        match self {
            PageSize::Fixed(n) => n.to_string(),
            PageSize::All => "all".to_string(),
        }
    }
}

/// One rendered page of a result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<'a, T> {
    /// 1-based, clamped into `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Index of the first visible item
    pub start: usize,
    /// One past the last visible item
    pub end: usize,
    pub items: &'a [T],
    pub is_first: bool,
    pub is_last: bool,
}

impl<T> PageView<'_, T> {
    /// "Page 2 of 7"
    pub fn page_info(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// Slice out one page
///
/// Out-of-range page indices clamp to the nearest valid page. An empty list
/// is a single empty page.
pub fn render_page<T>(items: &[T], page_size: PageSize, page_index: usize) -> PageView<'_, T> {
    let total_items = items.len();
    let size = match page_size {
        PageSize::Fixed(n) => n.max(1),
        PageSize::All => total_items.max(1),
    };

    let total_pages = total_items.div_ceil(size).max(1);
    let page = page_index.clamp(1, total_pages);
    let start = ((page - 1) * size).min(total_items);
    let end = (start + size).min(total_items);

    PageView {
        page,
        total_pages,
        total_items,
        start,
        end,
        items: &items[start..end],
        is_first: page == 1,
        is_last: page == total_pages,
    }
}

// ============================================================================
// Section rendering
// ============================================================================

/// Render model for one section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    /// "ID {id}: {title}"
    pub heading: String,
    pub blocks: Vec<ContentBlock>,
}

/// A paragraph (or the whole flat content) and its subsections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub label: Option<String>,
    /// Text split on newlines, tabs widened; escaping is left to the template
    pub lines: Vec<String>,
    pub subsections: Vec<ContentBlock>,
}

impl ContentBlock {
    fn from_text(label: Option<String>, text: Option<&str>) -> Self {
        Self {
            label,
            lines: text
                .map(|t| t.split('\n').map(|l| l.replace('\t', TAB_REPLACEMENT)).collect())
                .unwrap_or_default(),
            subsections: Vec::new(),
        }
    }
}

impl SectionView {
    pub fn from_section(section: &Section) -> Self {
        let heading = format!(
            "ID {}: {}",
            section.id,
            section.title.as_deref().unwrap_or_default()
        );

        let blocks = match &section.content {
            Some(Content::Structured(s)) => {
                let numbered = s.paragraphs.len() > 1;
                s.paragraphs
                    .iter()
                    .map(|p| {
                        let label = numbered.then(|| format!("Paragraph {}", label_text(p.label())));
                        let mut block = ContentBlock::from_text(label, p.text());
                        block.subsections = p
                            .subsections()
                            .iter()
                            .map(|sub| {
                                ContentBlock::from_text(
                                    Some(format!("Subsection {}", label_text(sub.label()))),
                                    sub.text(),
                                )
                            })
                            .collect();
                        block
                    })
                    .collect()
            }
            Some(other) => vec![ContentBlock::from_text(None, Some(other.flatten_text().as_str()))],
            None => Vec::new(),
        };

        Self { heading, blocks }
    }
}

fn label_text(label: Option<&crate::dataset::Identifier>) -> String {
    label.map(|l| l.to_string()).unwrap_or_default()
}
