use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// National chains recognised by the text fallback when no registry file is
/// configured. Both spellings of Billa occur in page text.
const DEFAULT_RETAILER_NAMES: &[&str] = &[
    "Lidl",
    "Penny Market",
    "Kaufland",
    "Tesco",
    "Albert",
    "BILLA",
    "Billa",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerConfig {
    pub name: String,
    /// Custom offer pattern. When absent the built-in pattern for `name` is used.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl RetailerConfig {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerConfig>,
}

/// The built-in retailer registry.
#[must_use]
pub fn default_retailers() -> Vec<RetailerConfig> {
    DEFAULT_RETAILER_NAMES
        .iter()
        .map(|name| RetailerConfig::named(name))
        .collect()
}

/// Load and validate a retailer registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let retailers_file: RetailersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RetailersFileParse)?;

    validate_retailers(&retailers_file)?;

    Ok(retailers_file)
}

fn validate_retailers(retailers_file: &RetailersFile) -> Result<(), ConfigError> {
    if retailers_file.retailers.is_empty() {
        return Err(ConfigError::Validation(
            "retailers file lists no retailers".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for retailer in &retailers_file.retailers {
        if retailer.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer name must be non-empty".to_string(),
            ));
        }

        // Case matters: "BILLA" and "Billa" are distinct page spellings.
        if !seen_names.insert(retailer.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer name: '{}'",
                retailer.name
            )));
        }

        if retailer
            .pattern
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' has an empty pattern",
                retailer.name
            )));
        }
    }

    Ok(())
}
