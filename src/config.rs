//! Site configuration loading.
//!
//! An optional `config.toml` in the content root carries site identity and,
//! if wanted, an explicit category order:
//!
//! ```toml
//! title = "fieldnotes"
//! url = "https://example.org"
//! description = "notes from the field"
//! categories = ["tech", "ramblings"]
//! ```
//!
//! Every field has a default, and a missing file is not an error — a bare
//! content directory builds with stock settings. When `categories` is empty
//! the build discovers them from the content subdirectories instead.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Site-wide settings from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, shown in the header and as the index page title.
    pub title: String,
    /// Canonical base URL, no trailing slash. Empty disables canonical links.
    pub url: String,
    /// One-line site description used as the default meta description.
    pub description: String,
    /// Post categories in display order. Empty means auto-discover from the
    /// content subdirectories, sorted by name.
    pub categories: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "blog".to_string(),
            url: String::new(),
            description: String::new(),
            categories: Vec::new(),
        }
    }
}

/// Load `config.toml` from the content root, falling back to defaults when
/// the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join("config.toml");
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "blog");
        assert!(config.categories.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
title = "fieldnotes"
url = "https://example.org"
description = "notes from the field"
categories = ["tech", "ramblings"]
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "fieldnotes");
        assert_eq!(config.url, "https://example.org");
        assert_eq!(config.categories, vec!["tech", "ramblings"]);
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "title = \"mine\"\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "mine");
        assert_eq!(config.url, "");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "title = [broken\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
