//! Thai Law Data API
//!
//! Query service over three Thai legal codes stored as JSON.
//!
//! - `dataset`: section model (flat or paragraph-structured content) and file store
//! - `query_engine`: filter → search → sort → paginate pipeline
//! - `categories`: categories config, loaded once at startup
//! - `api_server` / `web` (feature `api`): HTTP API, browser UI, static files

pub mod utils;
pub mod error;
pub mod dataset;
pub mod query_engine;
pub mod categories;
pub mod config;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use error::QueryError;
pub use dataset::{Content, DatasetCode, DatasetStore, Identifier, Paragraph, Section, Subsection};
pub use query_engine::{Envelope, LawQuery, QueryEngine};
pub use categories::{CategoryConfig, CategoryError};
pub use config::ServerConfig;

#[cfg(feature = "api")]
pub use api_server::{AppState, create_router};
