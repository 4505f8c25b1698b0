// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Webshell native platform bridge abstractions.
//!
//! The shell core never talks to the operating system directly. Storage
//! authorization, download locations, external viewers, user notices and the
//! bundled asset tree are reached through the traits in [`traits`], with one
//! implementation per target.

mod stream;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod desktop;

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni-rs` calls into the hosting Activity.
        Box::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        Box::new(desktop::DesktopBridge::from_env())
    }
}
