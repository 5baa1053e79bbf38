use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub extensions: ExtensionsConfig,
    pub code: CodeConfig,
    pub figure: FigureConfig,
    pub table: TableConfig,
}

/// Markdown syntax extensions recognized by the parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub tables: bool,
    pub footnotes: bool,
    /// `"text"` becomes a typographic quotation.
    pub quote: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    /// `_text_` underlines instead of italicizing.
    pub underline: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            quote: true,
            strikethrough: false,
            superscript: false,
            underline: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Font size command name passed to minted, without the backslash.
    pub font_size: String,
    pub default_language: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            font_size: "footnotesize".to_string(),
            default_language: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: String,
    pub placement: String,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: "0.9\\linewidth".to_string(),
            placement: "htbp".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub placement: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            placement: "htbp".to_string(),
        }
    }
}

impl Config {
    /// The configuration embedded at build time from `default_config.toml`.
    pub fn compiled_default() -> Self {
        // build.rs rejects a default that fails to parse, and the
        // `embedded_default_deserializes` test covers the struct mapping.
        Self::from_toml("").unwrap_or_default()
    }

    /// Parse a TOML document layered over the embedded defaults. Keys missing
    /// from `content` keep the value from `default_config.toml`.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut merged = DEFAULT_CONFIG.parse::<toml::Table>()?;
        merge_tables(&mut merged, content.parse::<toml::Table>()?);
        toml::Value::Table(merged).try_into()
    }

    /// Load config from a TOML file on top of the embedded defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(overlay) if base.get(&key).is_some_and(toml::Value::is_table) => {
                if let Some(toml::Value::Table(base)) = base.get_mut(&key) {
                    merge_tables(base, overlay);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_struct_default() {
        let compiled = Config::compiled_default();
        let fallback = Config::default();
        assert_eq!(compiled.code.font_size, fallback.code.font_size);
        assert_eq!(compiled.code.default_language, "text");
        assert_eq!(compiled.figure.width, "0.9\\linewidth");
        assert_eq!(compiled.figure.placement, fallback.figure.placement);
        assert_eq!(compiled.table.placement, "htbp");
        assert!(compiled.extensions.tables);
        assert!(compiled.extensions.footnotes);
        assert!(compiled.extensions.quote);
        assert!(!compiled.extensions.underline);
    }

    #[test]
    fn embedded_default_deserializes() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.figure.width, "0.9\\linewidth");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[code]\nfont_size = \"small\"\n").unwrap();
        assert_eq!(config.code.font_size, "small");
        assert_eq!(config.code.default_language, "text");
        assert_eq!(config.figure.placement, "htbp");
        assert!(config.extensions.tables);
    }

    #[test]
    fn user_values_override_embedded_defaults() {
        let config = Config::from_toml("[extensions]\ntables = false\n[table]\nplacement = \"H\"\n")
            .unwrap();
        assert!(!config.extensions.tables);
        assert!(config.extensions.footnotes);
        assert_eq!(config.table.placement, "H");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(Config::from_toml("[code\n").is_err());
        assert!(Config::from_toml("[code]\nfont_size = 3\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/mdlatex.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
