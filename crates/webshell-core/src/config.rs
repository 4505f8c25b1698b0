// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shell configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ShellError};
use crate::types::{AfterSave, DestinationPolicy};

/// Host used by the Android asset loader for its virtual origin.
pub const DEFAULT_VIRTUAL_ORIGIN: &str = "appassets.androidplatform.net";

/// Persistent shell settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Synthetic HTTPS host whose requests are answered from the asset bundle.
    pub virtual_origin: String,
    /// Path prefix under the virtual origin that maps onto the asset bundle root.
    pub asset_path_prefix: String,
    /// Page loaded on startup, relative to the asset bundle root.
    pub start_page: String,
    /// Load this remote URL instead of the bundled app.
    pub remote_start_url: Option<String>,
    /// Label prepended to saved file names (`<prefix>_<millis>.pdf`).
    pub file_prefix: String,
    pub destination: DestinationPolicy,
    pub after_save: AfterSave,
    /// URL schemes the browser control cannot render; top-level navigations
    /// to these are handed to the platform.
    pub external_schemes: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            virtual_origin: DEFAULT_VIRTUAL_ORIGIN.into(),
            asset_path_prefix: "/assets/".into(),
            start_page: "index.html".into(),
            remote_start_url: None,
            file_prefix: "Recibo".into(),
            destination: DestinationPolicy::PublicDownloads,
            after_save: AfterSave::Notify,
            external_schemes: ["tel", "mailto", "whatsapp", "intent", "geo", "sms"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ShellConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce unusable file names or URLs.
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            return Err(ShellError::Config("file_prefix must not be empty".into()));
        }
        if self
            .file_prefix
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '\0'))
        {
            return Err(ShellError::Config(format!(
                "file_prefix {:?} must not contain path separators",
                self.file_prefix
            )));
        }
        if !self.asset_path_prefix.starts_with('/') || !self.asset_path_prefix.ends_with('/') {
            return Err(ShellError::Config(format!(
                "asset_path_prefix {:?} must start and end with '/'",
                self.asset_path_prefix
            )));
        }
        if self.virtual_origin.is_empty() {
            return Err(ShellError::Config("virtual_origin must not be empty".into()));
        }
        if let Some(remote) = &self.remote_start_url {
            let url = Url::parse(remote).map_err(|e| url_err(remote, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ShellError::InvalidUrl(format!(
                    "{remote}: start URL must be http or https"
                )));
            }
        }
        Ok(())
    }

    /// URL the browser control loads on startup.
    pub fn start_url(&self) -> String {
        match &self.remote_start_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}{}{}",
                self.virtual_origin, self.asset_path_prefix, self.start_page
            ),
        }
    }
}

fn url_err(url: &str, e: url::ParseError) -> ShellError {
    ShellError::InvalidUrl(format!("{url}: {e}"))
}
