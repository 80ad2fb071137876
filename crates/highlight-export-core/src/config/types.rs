//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::group::ColorConfig;

/// Default number of highlights requested per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Default note file extension
pub const DEFAULT_EXTENSION: &str = "md";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Readeck connection
    #[serde(default)]
    pub readeck: ReadeckConfig,

    /// Note output
    #[serde(default)]
    pub export: ExportConfig,

    /// Color categories
    #[serde(default)]
    pub colors: ColorConfig,
}

/// Connection settings for the highlight service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadeckConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Highlights per page (10..=100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ReadeckConfig {
    fn default() -> Self {
        ReadeckConfig {
            base_url: String::new(),
            token: String::new(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Where and how notes are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Notes root directory (required for sync)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_dir: Option<PathBuf>,

    /// Note file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Tags added to every generated note
    #[serde(default = "default_base_tags")]
    pub base_tags: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            notes_dir: None,
            extension: default_extension(),
            base_tags: default_base_tags(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_base_tags() -> Vec<String> {
    vec![
        "highlights".to_string(),
        "zettelkasten".to_string(),
        "fleeting-note".to_string(),
    ]
}
