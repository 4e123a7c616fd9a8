use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub toc: TocOptions,
    #[serde(default)]
    pub collapsible: CollapsibleOptions,
    #[serde(default)]
    pub images: ImageOptions,
}

/// Where the table of contents is written and how its lists are tagged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    pub container_tag: String,
    pub container_id: String,
    pub list_tag: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            container_tag: "ul".to_string(),
            container_id: "MainMenu".to_string(),
            list_tag: "ul".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollapsibleOptions {
    pub class: String,
    pub control_tag: String,
    pub control_class: String,
    pub on_click: String,
    pub indicator_class: String,
}

impl Default for CollapsibleOptions {
    fn default() -> Self {
        Self {
            class: "collapsible".to_string(),
            control_tag: "span".to_string(),
            control_class: "control".to_string(),
            on_click: "this.parentNode.classList.toggle(\"collapsed\");void(0);".to_string(),
            indicator_class: "image".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub mime_type: String,
    pub scope: ImageScope,
    /// Directory relative image paths resolve against. Defaults to the
    /// working directory.
    pub base_dir: Option<PathBuf>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            mime_type: "image/png".to_string(),
            scope: ImageScope::Document,
            base_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageScope {
    #[default]
    Document,
    TableOfContents,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Ok(Self::from_toml(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.toc.container_tag, "ul");
        assert_eq!(config.toc.container_id, "MainMenu");
        assert_eq!(config.collapsible.class, "collapsible");
        assert_eq!(
            config.collapsible.on_click,
            "this.parentNode.classList.toggle(\"collapsed\");void(0);"
        );
        assert_eq!(config.images.mime_type, "image/png");
        assert_eq!(config.images.scope, ImageScope::Document);
        assert!(config.images.base_dir.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml("[toc]\ncontainer_id = \"Nav\"\n").unwrap();
        assert_eq!(config.toc.container_id, "Nav");
        assert_eq!(config.toc.container_tag, "ul");
        assert_eq!(config.toc.list_tag, "ul");
    }

    #[test]
    fn test_load_fixture_config() {
        let config = Config::load(&fixture_path("custom.toml")).unwrap();
        assert_eq!(config.toc.container_tag, "ol");
        assert_eq!(config.toc.container_id, "Contents");
        assert_eq!(config.toc.list_tag, "ol");
        assert_eq!(config.collapsible.class, "foldable");
        assert_eq!(config.images.mime_type, "image/jpeg");
        assert_eq!(config.images.scope, ImageScope::TableOfContents);
        assert_eq!(config.images.base_dir, Some(PathBuf::from("assets")));
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        assert!(Config::from_toml("[images]\nscope = \"everywhere\"\n").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/guideprep.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(ref p, _) if p.ends_with("guideprep.toml")));
    }
}
