//! Presentation settings, read from a RON file.
//!
//! ```ron
//! (
//!     locale: (
//!         decimal_separator: ',',
//!         grouping_separator: Some('.'),
//!         symbol_position: Suffix,
//!         symbol_spacing: true,
//!     ),
//!     description_placeholder: "(ohne Beschreibung)",
//!     show_hidden: false,
//!     page_size: 25,
//! )
//! ```

use anyhow::{Context, Result};
use serde_derive::Deserialize;

use crate::currency::Locale;
use crate::filespec::FileSpec;
use crate::normalize::DEFAULT_DESCRIPTION_PLACEHOLDER;

/// Transactions per page when no limit is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub locale: Locale,
    /// Shown in place of a missing transaction description.
    pub description_placeholder: String,
    /// Include hidden accounts when rendering the account tree.
    pub show_hidden: bool,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            description_placeholder: DEFAULT_DESCRIPTION_PLACEHOLDER.to_string(),
            show_hidden: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_ron_str(s: &str) -> Result<Self> {
        ron::de::from_str(s).map_err(Into::into)
    }

    pub fn from_filespec(file_spec: &FileSpec) -> Result<Self> {
        let reader = file_spec.reader()?;
        ron::de::from_reader(reader).with_context(|| format!("reading config from {}", file_spec))
    }

    /// Loads `file_spec` if given, otherwise the defaults.
    pub fn load(file_spec: Option<&FileSpec>) -> Result<Self> {
        match file_spec {
            Some(spec) => Self::from_filespec(spec),
            None => Ok(Self::default()),
        }
    }
}
