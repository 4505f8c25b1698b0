// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webshell navigation policy: which requests are answered from the bundled
// web app, which are handed to other apps, and which the browser control
// loads itself.

pub mod asset_loader;
pub mod mime;
pub mod policy;

pub use asset_loader::VirtualOriginLoader;
pub use policy::NavigationPolicy;
