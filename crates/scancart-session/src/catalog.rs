//! # Product Catalog Loading
//!
//! Reads the product index from disk, or falls back to the host's bundled copy.

use std::collections::HashMap;
use std::path::Path;

use scancart_core::{Product, ProductIndex};
use tracing::info;

use crate::config::CatalogSettings;
use crate::error::{SessionError, SessionResult};

/// Loads a product index from a JSON file.
///
/// ## Errors
/// `SessionError::IndexLoadFailed` naming the path, for both I/O and
/// parse/validation failures.
pub fn load_index_file(path: &Path) -> SessionResult<ProductIndex> {
    let index_error = |reason: String| SessionError::IndexLoadFailed {
        path: path.display().to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| index_error(e.to_string()))?;
    let index = ProductIndex::from_json_str(&contents).map_err(|e| index_error(e.to_string()))?;

    info!(path = %path.display(), products = index.len(), "Product index loaded from file");
    Ok(index)
}

/// Resolves the index for a session.
///
/// Uses `catalog.product_index_path` when set, otherwise parses `bundled`.
pub fn resolve_index(catalog: &CatalogSettings, bundled: &str) -> SessionResult<ProductIndex> {
    match &catalog.product_index_path {
        Some(path) => load_index_file(path),
        None => {
            let products: HashMap<String, Product> = serde_json::from_str(bundled)?;
            let index = ProductIndex::from_map(products)?;
            info!(products = index.len(), "Using bundled product index");
            Ok(index)
        }
    }
}
