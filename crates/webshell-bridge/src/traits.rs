// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the shell's native collaborators.

use std::path::{Path, PathBuf};

use webshell_core::error::Result;
use webshell_core::types::NoticeDuration;

/// Unified bridge that groups every native capability the shell needs.
///
/// `Send + Sync` so a single instance can sit behind the process-wide shell
/// used by the JNI entry points.
pub trait PlatformBridge:
    StorageAuthorization + StorageLocations + ExternalViewer + UserNotice + AssetBundle + Send + Sync
{
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;
}

/// Storage-write authorization.
pub trait StorageAuthorization {
    /// Whether this OS version needs an explicit user grant before writing to
    /// shared storage. Queried once when the authorization gate is built.
    fn requires_explicit_storage_grant(&self) -> bool;

    /// Whether the grant has already been given.
    fn has_storage_grant(&self) -> bool;

    /// Ask the user for the grant. Returns once the request is dispatched;
    /// the answer arrives later through the platform's own callback.
    fn request_storage_grant(&self) -> Result<()>;
}

/// Where downloaded files are written.
pub trait StorageLocations {
    /// The shared, user-visible Downloads directory.
    fn public_downloads_dir(&self) -> Result<PathBuf>;

    /// A Downloads directory inside the app's own external files area.
    fn private_downloads_dir(&self) -> Result<PathBuf>;
}

/// Hand-off to other applications.
pub trait ExternalViewer {
    /// Open a local file with whichever application handles `mime_type`.
    ///
    /// Returns `ShellError::NoViewerAvailable` when nothing is registered.
    fn open_file(&self, path: &Path, mime_type: &str) -> Result<()>;

    /// Open a URI (e.g. `tel:`, `mailto:`) with its registered handler.
    fn open_uri(&self, uri: &str) -> Result<()>;
}

/// Transient user-visible messages (toasts, status lines).
pub trait UserNotice {
    fn show_notice(&self, message: &str, duration: NoticeDuration);
}

/// Read-only access to the bundled web app.
pub trait AssetBundle {
    /// Read an asset by its path relative to the bundle root.
    ///
    /// Returns `Ok(None)` when the asset does not exist.
    fn read_asset(&self, relative_path: &str) -> Result<Option<Vec<u8>>>;
}
