//! # Product Index
//!
//! Static lookup table from barcode value to [`Product`].
//!
//! The table is bundled with the host at build time as JSON:
//!
//! ```json
//! {
//!   "3017620422003": { "name": "Hazelnut spread 400g", "ref1": "NUT-400", "ref2": "SHELF-12" },
//!   "5449000000996": { "name": "Cola 330ml", "ref1": "BEV-330", "ref2": "FRIDGE-2" }
//! }
//! ```
//!
//! Loaded once, never mutated. Reading the file is the caller's job; this
//! module only parses and validates.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CoreResult;
use crate::types::Product;
use crate::validation::validate_index_entry;

/// Immutable map of barcode value to product.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    products: HashMap<String, Product>,
}

impl ProductIndex {
    /// Creates an empty index. Every scan is then an unknown code.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses and validates an index from its JSON form.
    ///
    /// ## Errors
    /// - `CoreError::IndexLoadFailed` if the JSON is malformed
    /// - `CoreError::Validation` if a code or product name is blank
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let products: HashMap<String, Product> = serde_json::from_str(json)?;
        Self::from_map(products)
    }

    /// Builds an index from an already-decoded map, validating every entry.
    pub fn from_map(products: HashMap<String, Product>) -> CoreResult<Self> {
        for (code, product) in &products {
            validate_index_entry(code, product)?;
        }

        debug!(count = products.len(), "Product index loaded");
        Ok(ProductIndex { products })
    }

    /// Looks up a code. Exact match, no normalization.
    #[inline]
    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    /// Returns true if the code is known.
    #[inline]
    pub fn contains(&self, code: &str) -> bool {
        self.products.contains_key(code)
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the index has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    const SAMPLE: &str = r#"{
        "123": {"name": "Widget", "ref1": "A", "ref2": "B"},
        "456": {"name": "Gadget", "ref1": "C", "ref2": "D"}
    }"#;

    #[test]
    fn test_from_json_str() {
        let index = ProductIndex::from_json_str(SAMPLE).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("123"));

        let widget = index.get("123").unwrap();
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.ref1, "A");
        assert_eq!(widget.ref2, "B");
    }

    #[test]
    fn test_lookup_is_exact() {
        let index = ProductIndex::from_json_str(SAMPLE).unwrap();
        assert!(index.get(" 123").is_none());
        assert!(index.get("0123").is_none());
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let err = ProductIndex::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, CoreError::IndexLoadFailed(_)));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err =
            ProductIndex::from_json_str(r#"{"1": {"name": "", "ref1": "", "ref2": ""}}"#)
                .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_empty_index() {
        let index = ProductIndex::empty();
        assert!(index.is_empty());
        assert!(index.get("123").is_none());
    }
}
