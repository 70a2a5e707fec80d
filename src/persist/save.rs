use crate::sim::catalog::Catalog;
use anyhow::{Context, Result};
use ron::ser::PrettyConfig;
use std::fs;
use std::path::Path;

pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let pretty = PrettyConfig::new();
    let serialized = ron::ser::to_string_pretty(catalog, pretty)?;
    fs::write(path, serialized).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
