// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable notices for shell errors.
//
// Every technical error is mapped to one plain sentence plus a suggestion,
// short enough for a transient on-screen notice. The severity decides whether
// a notice is shown at all and for how long.

use crate::error::ShellError;
use crate::types::NoticeDuration;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Not worth interrupting the user (e.g. an ignored remote download).
    Silent,
    /// Something went wrong once; trying the same action again may work.
    Transient,
    /// The user must do something first (grant access, install a viewer).
    ActionRequired,
    /// Retrying will not help; the page produced unusable content.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    /// One-line notice text, or `None` when the error should stay silent.
    pub fn notice(&self) -> Option<String> {
        if self.severity == Severity::Silent {
            return None;
        }
        if self.suggestion.is_empty() {
            Some(self.message.clone())
        } else {
            Some(format!("{} {}", self.message, self.suggestion))
        }
    }

    /// How long the notice should stay on screen.
    pub fn duration(&self) -> NoticeDuration {
        match self.severity {
            Severity::ActionRequired => NoticeDuration::Long,
            _ => NoticeDuration::Short,
        }
    }
}

/// Convert a `ShellError` into a `HumanError`.
pub fn humanize_error(err: &ShellError) -> HumanError {
    match err {
        ShellError::UnsupportedScheme(_) => HumanError {
            message: "This file can't be saved from inside the app.".into(),
            suggestion: String::new(),
            severity: Severity::Silent,
        },

        ShellError::Decode(_) => HumanError {
            message: "The document could not be read.".into(),
            suggestion: "Try generating it again.".into(),
            severity: Severity::Permanent,
        },

        ShellError::Io(io) => humanize_io_error(io),

        ShellError::AuthorizationDenied => HumanError {
            message: "The app needs permission to save files.".into(),
            suggestion: "Allow storage access, then tap download again.".into(),
            severity: Severity::ActionRequired,
        },

        ShellError::NoViewerAvailable(_) => HumanError {
            message: "No app found to open PDF files.".into(),
            suggestion: "Install a PDF viewer; the file is in your Downloads.".into(),
            severity: Severity::ActionRequired,
        },

        ShellError::Bridge(detail) => HumanError {
            message: "The device refused the request.".into(),
            suggestion: format!("({detail})"),
            severity: Severity::Transient,
        },

        ShellError::InvalidUrl(url) => HumanError {
            message: "That link doesn't look right.".into(),
            suggestion: format!("({url})"),
            severity: Severity::Permanent,
        },

        ShellError::Config(detail) => HumanError {
            message: "The app settings are invalid.".into(),
            suggestion: format!("({detail})"),
            severity: Severity::Permanent,
        },

        ShellError::Serialization(_) => HumanError {
            message: "The app settings file is damaged.".into(),
            suggestion: "Default settings are being used.".into(),
            severity: Severity::Permanent,
        },
    }
}

fn humanize_io_error(io: &std::io::Error) -> HumanError {
    use std::io::ErrorKind;

    match io.kind() {
        ErrorKind::PermissionDenied => HumanError {
            message: "The app isn't allowed to write to Downloads.".into(),
            suggestion: "Check storage permission, then try again.".into(),
            severity: Severity::ActionRequired,
        },
        ErrorKind::StorageFull => HumanError {
            message: "Your device storage is full.".into(),
            suggestion: "Free up some space, then try again.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "The file could not be saved.".into(),
            suggestion: format!("Try again. ({io})"),
            severity: Severity::Transient,
        },
    }
}
