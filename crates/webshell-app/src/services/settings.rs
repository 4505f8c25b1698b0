// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration file loading.
//
// The desktop binary reads `config.json` from `DesktopBridge::data_dir()`;
// on Android the host Activity passes the same JSON to `nativeInit`.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};
use webshell_core::config::ShellConfig;
use webshell_core::error::Result;

/// Name of the settings file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Load `config.json` from `dir`.
///
/// A missing file is not an error (`Ok(None)`); a present but invalid one is.
pub fn load_config(dir: &Path) -> Result<Option<ShellConfig>> {
    let path = dir.join(CONFIG_FILE);
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config = ShellConfig::from_json(&json)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(Some(config))
}

/// Load the configuration, falling back to defaults on any problem.
pub fn load_config_or_default(dir: &Path) -> ShellConfig {
    match load_config(dir) {
        Ok(Some(config)) => config,
        Ok(None) => ShellConfig::default(),
        Err(e) => {
            warn!(error = %e, "configuration unusable, using defaults");
            ShellConfig::default()
        }
    }
}
