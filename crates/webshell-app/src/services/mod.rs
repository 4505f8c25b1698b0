// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer. Wires the navigation policy, the download bridge and the
// platform bridge into one object the browser control can call.

pub mod settings;
pub mod shell;
