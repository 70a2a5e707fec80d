use crate::sim::catalog::Catalog;
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads and validates a catalog. A missing file is `Ok(None)` so callers can
/// fall back to the built-in catalog.
pub fn load_catalog(path: &Path) -> Result<Option<Catalog>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let catalog: Catalog = ron::from_str(&content)
                .with_context(|| format!("parsing catalog {}", path.display()))?;
            catalog
                .validate()
                .with_context(|| format!("validating catalog {}", path.display()))?;
            Ok(Some(catalog))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
