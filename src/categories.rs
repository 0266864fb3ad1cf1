//! Categories Config - Loaded once, read many times
//!
//! `config/categories.json` maps a category name to the dataset ids it
//! groups. The host loads it at startup and shares it behind an `Arc`;
//! nothing re-reads the file afterwards.

use rustc_hash::FxHashSet;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::dataset::{DatasetCode, DatasetStore};
use crate::utils::get_display_name;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Failed to load categories config {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Category '{0}' not found in configuration")]
    UnknownCategory(String),

    #[error("Category '{0}' has no data IDs")]
    EmptyCategory(String),

    #[error("Data file for '{data_id}' (referenced by category '{category}') is unusable: {reason}")]
    UnusableDataset {
        category: String,
        data_id: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct CategoryConfig {
    /// Categories in file order
    categories: Vec<(String, Vec<String>)>,
    /// Document as loaded, served back verbatim
    document: Value,
}

impl CategoryConfig {
    pub fn load(path: &Path) -> Result<Self, CategoryError> {
        let load_err = |reason: String| CategoryError::Load {
            path: path.display().to_string(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| load_err(format!("invalid JSON: {}", e)))?;
        let config = Self::from_value(document).map_err(load_err)?;

        tracing::info!(
            "Loaded {} categories from {}",
            config.categories.len(),
            path.display()
        );
        Ok(config)
    }

    /// Build from an already-parsed document
    ///
    /// The document must be an object whose values are arrays of strings.
    pub fn from_value(document: Value) -> Result<Self, String> {
        let object = document
            .as_object()
            .ok_or_else(|| "config is not a JSON object".to_string())?;

        let mut categories = Vec::with_capacity(object.len());
        for (name, ids) in object {
            let ids = ids
                .as_array()
                .ok_or_else(|| format!("category '{}' does not map to an array", name))?
                .iter()
                .map(|id| {
                    id.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| format!("category '{}' contains a non-string id", name))
                })
                .collect::<Result<Vec<_>, _>>()?;
            categories.push((name.clone(), ids));
        }

        Ok(Self {
            categories,
            document,
        })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// (category, data ids) pairs in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn data_ids_for(&self, category: &str) -> Result<&[String], CategoryError> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, ids)| ids.as_slice())
            .ok_or_else(|| CategoryError::UnknownCategory(category.to_string()))
    }

    /// Unique data ids across every category, first-seen order
    pub fn all_data_ids(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.categories
            .iter()
            .flat_map(|(_, ids)| ids.iter())
            .filter(|id| seen.insert(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn display_name(data_id: &str) -> String {
        get_display_name(data_id)
    }

    /// Every category is non-empty and every id names a loadable dataset
    pub fn validate(&self, store: &DatasetStore) -> Result<(), CategoryError> {
        for (category, ids) in &self.categories {
            if ids.is_empty() {
                return Err(CategoryError::EmptyCategory(category.clone()));
            }
            for data_id in ids {
                let unusable = |reason: String| CategoryError::UnusableDataset {
                    category: category.clone(),
                    data_id: data_id.clone(),
                    reason,
                };
                let code: DatasetCode = data_id.parse().map_err(|e| unusable(format!("{}", e)))?;
                store.load(code).map_err(|e| unusable(e.to_string()))?;
            }
        }
        Ok(())
    }
}
