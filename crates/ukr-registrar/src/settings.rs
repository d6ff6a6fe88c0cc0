//! Deployment settings loaded from TOML.
//!
//! ```toml
//! token = "0x..."
//! owner = "0x..."
//! registrar = "0x..."
//! min_payment = "10000000000000000000"
//!
//! [policy]
//! auto_approve_enabled = true
//! window_size_blocks = 1000
//! approval_threshold = 5
//! registry_target = "0x..."
//! ```
//!
//! `min_payment` takes a TOML integer or a decimal string. Amounts above
//! `i64::MAX` must use the string form.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ukr_core::Address;

use crate::RegistrationConfig;

/// Settings loading failures.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings parse failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Static deployment settings of one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarSettings {
    /// Address of the payment token allowed to call `register`.
    pub token: Address,

    /// Owner of the gate (policy changes, manual approval).
    pub owner: Address,

    /// Address the gate presents to the downstream registry.
    pub registrar: Address,

    /// Minimum token amount per registration.
    #[serde(default, with = "ukr_core::util::decimal_u128")]
    pub min_payment: u128,

    /// Initial auto-approval policy.
    #[serde(default)]
    pub policy: RegistrationConfig,
}

impl RegistrarSettings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or the settings are inconsistent.
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let input = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    /// Returns `SettingsError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.token.is_zero() {
            return Err(SettingsError::Invalid("token must not be the zero address".into()));
        }
        if self.owner.is_zero() {
            return Err(SettingsError::Invalid("owner must not be the zero address".into()));
        }
        if self.registrar == self.token {
            return Err(SettingsError::Invalid(
                "registrar and token must be distinct addresses".into(),
            ));
        }
        Ok(())
    }
}
