// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::api_server::AppState;
use crate::dataset::{DatasetCode, Section};
use crate::error::QueryError;
use crate::query_engine::LawQuery;
use crate::utils::{get_display_name, parse_leading_int};
use crate::web::view_models::{render_page, PageSize, SectionView, PAGE_SIZE_CHOICES};

// ============================================================================
// Browse Page
// ============================================================================

/// Browse page state, carried entirely in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseParams {
    pub code: Option<String>,
    pub filter_id: Option<String>,
    pub filter_title: Option<String>,
    pub filter_content: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl BrowseParams {
    fn to_query(&self) -> LawQuery {
        LawQuery {
            code: self.code.clone(),
            filter_id: self.filter_id.clone(),
            filter_title: self.filter_title.clone(),
            filter_content: self.filter_content.clone(),
            search: self.search.clone(),
            ..Default::default()
        }
    }

    /// Link to another page of the same result list
    fn href(&self, page: usize, page_size: PageSize) -> String {
        let mut parts = Vec::new();
        for (key, value) in [
            ("code", &self.code),
            ("filter_id", &self.filter_id),
            ("filter_title", &self.filter_title),
            ("filter_content", &self.filter_content),
            ("search", &self.search),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                parts.push(format!("{}={}", key, urlencoding::encode(v)));
            }
        }
        parts.push(format!("page={}", page));
        parts.push(format!("page_size={}", page_size.as_param()));
        format!("/browse?{}", parts.join("&"))
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Navigation links; `None` renders a disabled control
pub struct PageNav {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
    pub page_info: String,
}

#[derive(Template)]
#[template(path = "pages/browse.html")]
pub struct BrowseTemplate {
    pub title: String,
    pub code_options: Vec<SelectOption>,
    pub page_size_options: Vec<SelectOption>,
    pub filter_id: String,
    pub filter_title: String,
    pub filter_content: String,
    pub search: String,
    pub error: Option<String>,
    pub summary: Option<String>,
    pub pagination: Option<PageNav>,
    pub sections: Vec<SectionView>,
}

impl BrowseTemplate {
    fn new(params: &BrowseParams, page_size: PageSize) -> Self {
        let selected_code = params
            .code
            .clone()
            .unwrap_or_else(|| DatasetCode::default().to_string());

        let code_options = DatasetCode::ALL
            .iter()
            .map(|c| SelectOption {
                value: c.as_str().to_string(),
                label: get_display_name(c.as_str()),
                selected: c.as_str() == selected_code,
            })
            .collect();

        let page_size_options = PAGE_SIZE_CHOICES
            .iter()
            .map(|n| PageSize::Fixed(*n))
            .chain(std::iter::once(PageSize::All))
            .map(|size| SelectOption {
                value: size.as_param(),
                label: size.as_param(),
                selected: size == page_size,
            })
            .collect();

        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        Self {
            title: "Thai Law Data".to_string(),
            code_options,
            page_size_options,
            filter_id: text(&params.filter_id),
            filter_title: text(&params.filter_title),
            filter_content: text(&params.filter_content),
            search: text(&params.search),
            error: None,
            summary: None,
            pagination: None,
            sections: Vec::new(),
        }
    }

    fn fill(
        &mut self,
        params: &BrowseParams,
        code: DatasetCode,
        sections: &[Section],
        page_size: PageSize,
        page_index: usize,
    ) {
        if sections.is_empty() {
            self.summary = Some("No items found matching your criteria".to_string());
            return;
        }

        let view = render_page(sections, page_size, page_index);
        self.summary = Some(format!(
            "Found {} items in {} (Showing {}-{}):",
            view.total_items,
            code.as_str().replace('_', " "),
            view.start + 1,
            view.end
        ));
        self.pagination = Some(PageNav {
            first: (!view.is_first).then(|| params.href(1, page_size)),
            prev: (!view.is_first).then(|| params.href(view.page - 1, page_size)),
            next: (!view.is_last).then(|| params.href(view.page + 1, page_size)),
            last: (!view.is_last).then(|| params.href(view.total_pages, page_size)),
            page_info: view.page_info(),
        });
        self.sections = view.items.iter().map(SectionView::from_section).collect();
    }
}

pub async fn browse_page(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Response {
    let page_size = PageSize::parse(params.page_size.as_deref());
    let page_index = params
        .page
        .as_deref()
        .and_then(parse_leading_int)
        .map_or(1, |p| usize::try_from(p).unwrap_or(1));

    let engine = state.query_engine.clone();
    let query = params.to_query();
    let result = tokio::task::spawn_blocking(move || engine.matching_sections(&query)).await;

    let mut template = BrowseTemplate::new(&params, page_size);
    let status = match result {
        Ok(Ok((code, sections))) => {
            template.fill(&params, code, &sections, page_size, page_index);
            StatusCode::OK
        }
        Ok(Err(e)) => {
            tracing::warn!("Browse query failed: {}", e);
            let status = browse_error_status(&e);
            template.error = Some(e.to_string());
            status
        }
        Err(e) => {
            tracing::error!("Browse task failed: {}", e);
            template.error = Some(format!("Task join error: {}", e));
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Template error: {}", e)),
        )
            .into_response(),
    }
}

fn browse_error_status(e: &QueryError) -> StatusCode {
    if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
