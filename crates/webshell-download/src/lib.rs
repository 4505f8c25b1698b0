// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webshell download bridge: decode `data:` URIs from the browser control,
// persist them under a unique time-stamped name, and gate writes on the
// platform's storage authorization.

pub mod bridge;
pub mod data_uri;
pub mod gate;
pub mod integrity;
pub mod naming;
pub mod writer;

pub use bridge::DownloadBridge;
pub use data_uri::DataUri;
pub use gate::AuthorizationGate;
pub use integrity::hash_bytes;
pub use naming::{Clock, FileNamer, SystemClock};
