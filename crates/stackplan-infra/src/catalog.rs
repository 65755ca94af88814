//! Catalog loading.
//!
//! The built-in catalog is embedded YAML. A `catalog_path` in `config.toml`
//! replaces it entirely with a file in the same format. Either way the
//! catalog is validated once at load and never mutated afterwards.

use std::path::Path;

use stackplan_types::catalog::Catalog;
use stackplan_types::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../catalog/stacks.yaml");

/// Parse and validate a YAML catalog.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog =
        serde_yaml_ng::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
    catalog.validate()?;
    Ok(catalog)
}

/// The catalog shipped with the binary.
pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Load the catalog from `path`, or the built-in one when `path` is `None`.
pub async fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    let Some(path) = path else {
        return builtin_catalog();
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
    let catalog = parse_catalog(&content)?;
    tracing::info!(
        path = %path.display(),
        domains = catalog.domains.len(),
        "loaded custom catalog"
    );
    Ok(catalog)
}
