// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage-write authorization gate.

use tracing::{info, warn};
use webshell_bridge::traits::StorageAuthorization;
use webshell_core::error::{Result, ShellError};

/// Decides whether a download may be written right now.
///
/// Whether the platform needs an explicit grant at all is asked once, at
/// construction; on platforms where the app's own output is always writable
/// the gate passes without touching the platform again.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate {
    requires_explicit_grant: bool,
}

impl AuthorizationGate {
    pub fn new<P: StorageAuthorization + ?Sized>(platform: &P) -> Self {
        let requires_explicit_grant = platform.requires_explicit_storage_grant();
        info!(requires_explicit_grant, "storage authorization gate ready");
        Self {
            requires_explicit_grant,
        }
    }

    pub fn requires_explicit_grant(&self) -> bool {
        self.requires_explicit_grant
    }

    pub fn has_write_access<P: StorageAuthorization + ?Sized>(&self, platform: &P) -> bool {
        !self.requires_explicit_grant || platform.has_storage_grant()
    }

    /// Check access; when it is missing, ask for it once and fail the attempt.
    ///
    /// The caller must not queue or retry: the user re-triggers the save
    /// after granting.
    pub fn authorize<P: StorageAuthorization + ?Sized>(&self, platform: &P) -> Result<()> {
        if self.has_write_access(platform) {
            return Ok(());
        }
        warn!("storage grant missing, requesting it and abandoning this download");
        if let Err(e) = platform.request_storage_grant() {
            warn!(error = %e, "storage grant request could not be dispatched");
        }
        Err(ShellError::AuthorizationDenied)
    }
}
