// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webshell host library. `Shell` receives every callback the browser
// control emits; the Android host Activity reaches it through the JNI entry
// points in `android`, the desktop harness calls it directly.

pub mod services;

#[cfg(target_os = "android")]
pub mod android;

pub use services::shell::{DownloadAttempt, Shell};
