// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared domain types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ShellError;

/// MIME type used when handing saved documents to an external viewer.
pub const PDF_MIME: &str = "application/pdf";

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

/// A save action reported by the browser control.
///
/// Built from the download notification signature
/// `(url, user_agent, content_disposition, mime_type, content_length)` and
/// consumed synchronously by the download bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Either an inline `data:` URI or a remote URL.
    pub source: String,
    pub user_agent: String,
    pub content_disposition: String,
    pub mime_type: String,
    /// Declared length; negative values from the platform mean "unknown".
    pub content_length: Option<u64>,
}

impl DownloadRequest {
    /// Build a request from the raw notification arguments.
    pub fn from_notification(
        url: impl Into<String>,
        user_agent: impl Into<String>,
        content_disposition: impl Into<String>,
        mime_type: impl Into<String>,
        content_length: i64,
    ) -> Self {
        Self {
            source: url.into(),
            user_agent: user_agent.into(),
            content_disposition: content_disposition.into(),
            mime_type: mime_type.into(),
            content_length: u64::try_from(content_length).ok(),
        }
    }

    /// Shorthand for tests and the desktop harness.
    pub fn from_source(source: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::from_notification(source, "", "", mime_type, -1)
    }

    /// Whether the source is an inline `data:` URI (scheme is case-insensitive).
    pub fn is_data_uri(&self) -> bool {
        self.source
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    }
}

/// A file written by the download bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub path: PathBuf,
    pub bytes: usize,
    /// SHA-256 of the written bytes, lowercase hex.
    pub sha256: String,
}

impl SavedDownload {
    /// File name component of the saved path, for notices.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of a single `handle_download` call.
#[derive(Debug)]
pub enum DownloadOutcome {
    Saved(SavedDownload),
    /// The source was not a `data:` URI. Nothing was written.
    Ignored,
    Failed(ShellError),
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Where decoded downloads are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// The shared, user-visible Downloads directory.
    #[default]
    PublicDownloads,
    /// A Downloads subdirectory of the app's external files area.
    AppPrivateDownloads,
}

/// What the shell does once a download has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterSave {
    /// Show a transient confirmation notice.
    #[default]
    Notify,
    /// Open the file with any registered PDF viewer.
    OpenViewer,
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// A resource request observed by the browser control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub url: String,
    /// True for top-level navigations, false for subresources.
    pub is_main_frame: bool,
}

impl ResourceRequest {
    pub fn main_frame(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_main_frame: true,
        }
    }

    pub fn subresource(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_main_frame: false,
        }
    }
}

/// Content served from the asset bundle in place of a network fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub reason: &'static str,
    pub mime_type: String,
    /// Text encoding for textual assets, `None` for binary.
    pub encoding: Option<&'static str>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(mime_type: impl Into<String>, encoding: Option<&'static str>, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            mime_type: mime_type.into(),
            encoding,
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            reason: "Not Found",
            mime_type: "text/plain".into(),
            encoding: Some("utf-8"),
            body: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Outcome of the navigation policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Answer the request from the asset bundle.
    ServeLocal(AssetResponse),
    /// Cancel the navigation and pass the URL to an external handler.
    HandleExternally(String),
    /// Let the browser control load it normally, inside the same view.
    AllowInPlace,
}

/// What to do when the user presses the system back button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    GoBack,
    Exit,
}

/// Display length for a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeDuration {
    Short,
    Long,
}

/// Severity of a console message forwarded from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Warning,
    Error,
}

impl ConsoleLevel {
    /// Map the platform's numeric console level.
    ///
    /// Android's `ConsoleMessage.MessageLevel` declares
    /// `TIP, LOG, WARNING, ERROR, DEBUG`, in that ordinal order.
    pub fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            0 | 4 => Self::Debug, // TIP, DEBUG
            2 => Self::Warning,
            3 => Self::Error,
            _ => Self::Log,
        }
    }
}
