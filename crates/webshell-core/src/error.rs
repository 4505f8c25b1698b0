// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Webshell.

use thiserror::Error;

/// Top-level error type for all Webshell operations.
#[derive(Debug, Error)]
pub enum ShellError {
    // -- Download errors --
    #[error("unsupported download scheme: {0}")]
    UnsupportedScheme(String),

    #[error("payload decode failed: {0}")]
    Decode(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Platform collaborators --
    #[error("storage write access has not been granted")]
    AuthorizationDenied,

    #[error("no application is available to open {0}")]
    NoViewerAvailable(String),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    // -- Navigation --
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShellError>;
