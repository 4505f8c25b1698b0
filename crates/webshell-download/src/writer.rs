// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking, create-new file writes.
//
// A destination that already exists is never truncated. Names are timestamped
// so clashes only happen within one millisecond; those get a `_<n>` suffix.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::naming::FileNamer;

/// Collision suffixes tried before giving up.
pub const MAX_COLLISION_SUFFIX: u32 = 99;

/// Write `bytes` to a new file in `dir` named after `millis`.
///
/// Creates `dir` if needed. The bytes go out in one sequential write; a
/// failure part-way may leave a truncated file behind.
pub fn write_unique(dir: &Path, namer: &FileNamer, millis: i64, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    for attempt in 0..=MAX_COLLISION_SUFFIX {
        let path = dir.join(namer.candidate(millis, attempt));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "destination exists, trying next suffix");
                continue;
            }
            Err(e) => return Err(e),
        };
        file.write_all(bytes)?;
        file.flush()?;
        return Ok(path);
    }

    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("every name for {} is taken", namer.file_name(millis)),
    ))
}
