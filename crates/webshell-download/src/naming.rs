// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Destination file naming: `<prefix>_<epoch-millis>.pdf`.

use chrono::Utc;

/// Extension given to every saved download.
pub const EXTENSION: &str = "pdf";

/// Source of wall-clock time, injectable for tests.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Builds file names from a fixed label and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNamer {
    prefix: String,
}

impl FileNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `Recibo_1700000000000.pdf`.
    pub fn file_name(&self, millis: i64) -> String {
        format!("{}_{millis}.{EXTENSION}", self.prefix)
    }

    /// Name to try on the `attempt`-th collision; attempt 0 is the plain name.
    pub fn candidate(&self, millis: i64, attempt: u32) -> String {
        if attempt == 0 {
            self.file_name(millis)
        } else {
            format!("{}_{millis}_{attempt}.{EXTENSION}", self.prefix)
        }
    }
}
