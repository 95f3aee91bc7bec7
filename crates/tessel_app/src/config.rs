//! Application configuration

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for an [`App`](crate::App)
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```rust
/// use tessel_app::Config;
///
/// let config = Config::from_toml_str(r#"
///     root_classes = ["app"]
///
///     [element_aliases]
///     row = "div"
/// "#).unwrap();
/// assert_eq!(config.root_tag, "div");
/// assert_eq!(config.element_aliases["row"], "div");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development-mode warnings for usage errors and duplicate keys
    pub diagnostics: bool,
    /// Separator joining local keys into an identity
    pub key_separator: char,
    /// Tag of the root element
    pub root_tag: String,
    /// Classes applied to the root element every pass
    pub root_classes: Vec<String>,
    /// Call names mapped to real HTML tags
    pub element_aliases: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }
}

impl Config {
    /// Diagnostics on
    pub fn development() -> Self {
        Self {
            diagnostics: true,
            key_separator: '/',
            root_tag: "div".to_string(),
            root_classes: Vec::new(),
            element_aliases: IndexMap::new(),
        }
    }

    /// Diagnostics off
    pub fn production() -> Self {
        Self {
            diagnostics: false,
            ..Self::development()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Builder: add a tag alias
    pub fn alias(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.element_aliases.insert(name.into(), tag.into());
        self
    }

    /// The real tag aliased by an HTML call name
    pub fn alias_for(&self, name: &str) -> Option<&str> {
        self.element_aliases.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(Config::development().diagnostics);
        assert!(!Config::production().diagnostics);
        assert_eq!(Config::production().key_separator, '/');
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str("diagnostics = false\nkey_separator = \".\"").unwrap();
        assert!(!config.diagnostics);
        assert_eq!(config.key_separator, '.');
        assert_eq!(config.root_tag, "div");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("root_tag = 3"),
            Err(crate::AppError::Config(_))
        ));
    }

    #[test]
    fn test_alias_resolution() {
        let config = Config::development().alias("row", "div");
        assert_eq!(config.alias_for("row"), Some("div"));
        assert_eq!(config.alias_for("span"), None);
    }
}
