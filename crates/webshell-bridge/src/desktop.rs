// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge for Linux/macOS builds and CI.
//
// Desktop systems have no storage grant to ask for, so authorization always
// passes. Downloads go to the XDG download directory, the asset bundle is a
// plain directory, and external viewers are launched through `xdg-open`
// (`open` on macOS). Notices are written to the log.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use webshell_core::error::{Result, ShellError};
use webshell_core::types::NoticeDuration;

use crate::traits::*;

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Bridge returned on non-mobile platforms.
#[derive(Debug, Clone)]
pub struct DesktopBridge {
    downloads_dir: PathBuf,
    data_dir: PathBuf,
    asset_root: PathBuf,
    opener: String,
}

impl DesktopBridge {
    pub fn new(downloads_dir: PathBuf, data_dir: PathBuf, asset_root: PathBuf) -> Self {
        Self {
            downloads_dir,
            data_dir,
            asset_root,
            opener: OPENER.into(),
        }
    }

    /// Resolve directories from the environment.
    ///
    /// `WEBSHELL_ASSETS` overrides the asset directory, which otherwise lives
    /// at `<data dir>/assets`.
    pub fn from_env() -> Self {
        let data_dir = data_dir();
        let asset_root = std::env::var_os("WEBSHELL_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("assets"));
        Self::new(downloads_dir(), data_dir, asset_root)
    }

    /// Replace the program used to open files and URIs.
    pub fn with_opener(mut self, opener: impl Into<String>) -> Self {
        self.opener = opener.into();
        self
    }

    /// `$XDG_DATA_HOME/webshell` by default. Holds `config.json` and the
    /// app-private Downloads directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn launch(&self, target: &str) -> Result<()> {
        match Command::new(&self.opener).arg(target).status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                tracing::warn!(opener = %self.opener, target, %status, "opener reported failure");
                Err(ShellError::NoViewerAvailable(target.to_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(opener = %self.opener, "opener program not installed");
                Err(ShellError::NoViewerAvailable(target.to_owned()))
            }
            Err(e) => Err(ShellError::Bridge(format!("{}: {e}", self.opener))),
        }
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl StorageAuthorization for DesktopBridge {
    fn requires_explicit_storage_grant(&self) -> bool {
        false
    }

    fn has_storage_grant(&self) -> bool {
        true
    }

    fn request_storage_grant(&self) -> Result<()> {
        Ok(())
    }
}

impl StorageLocations for DesktopBridge {
    fn public_downloads_dir(&self) -> Result<PathBuf> {
        Ok(self.downloads_dir.clone())
    }

    fn private_downloads_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir.join("Download"))
    }
}

impl ExternalViewer for DesktopBridge {
    fn open_file(&self, path: &Path, mime_type: &str) -> Result<()> {
        tracing::info!(path = %path.display(), mime = mime_type, "opening file externally");
        self.launch(&path.to_string_lossy())
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        tracing::info!(uri, "opening URI externally");
        self.launch(uri)
    }
}

impl UserNotice for DesktopBridge {
    fn show_notice(&self, message: &str, duration: NoticeDuration) {
        tracing::info!(target: "webshell::notice", ?duration, "{message}");
    }
}

impl AssetBundle for DesktopBridge {
    fn read_asset(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
        let relative = Path::new(relative_path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Ok(None);
        }
        match std::fs::read(self.asset_root.join(relative)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory resolution
// ---------------------------------------------------------------------------

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn downloads_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DOWNLOAD_DIR") {
        return PathBuf::from(dir);
    }
    match home_dir() {
        Some(home) => home.join("Downloads"),
        None => std::env::temp_dir(),
    }
}

fn data_dir() -> PathBuf {
    let base = match std::env::var_os("XDG_DATA_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => match home_dir() {
            Some(home) => home.join(".local").join("share"),
            None => std::env::temp_dir(),
        },
    };
    base.join("webshell")
}
