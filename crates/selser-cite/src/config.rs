/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Site configuration for citation rendering.
 */

//! Citation configuration.
//!
//! ```toml
//! responsive-references = true
//! responsive-threshold = 10
//! page-uri = "./Main_Page"
//! max-nesting-depth = 40
//! ```
//!
//! Every key is optional. A per-list `responsive` attribute overrides
//! `responsive-references` for that list.

use selser_dom::DEFAULT_MAX_NESTING_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse config: {0}")]
    InvalidConfig(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CiteConfig {
    /// Wrap reference lists in a responsive container.
    pub responsive_references: bool,

    /// Entry count above which a wrapped list gets the multi-column hint.
    pub responsive_threshold: usize,

    /// Prefix of every citation and back-link `href`.
    pub page_uri: String,

    /// Cap on nested citations, nested lists and embedded HTML.
    pub max_nesting_depth: usize,
}

impl Default for CiteConfig {
    fn default() -> Self {
        Self {
            responsive_references: true,
            responsive_threshold: 10,
            page_uri: "./Main_Page".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl CiteConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn with_responsive_threshold(mut self, threshold: usize) -> Self {
        self.responsive_threshold = threshold;
        self
    }

    pub fn with_responsive_references(mut self, responsive: bool) -> Self {
        self.responsive_references = responsive;
        self
    }

    pub fn with_page_uri(mut self, page_uri: impl Into<String>) -> Self {
        self.page_uri = page_uri.into();
        self
    }
}
