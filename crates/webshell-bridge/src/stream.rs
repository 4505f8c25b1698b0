// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chunked reads from platform-owned streams.

#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use webshell_core::error::Result;

/// Read `stream` to the end, then close it on every path.
///
/// `read_chunk` appends one chunk to the buffer and returns `false` at end
/// of stream. A read failure is returned after the stream is closed; a close
/// failure is only logged, since the bytes already read are complete.
pub(crate) fn drain_and_close<S>(
    stream: &mut S,
    mut read_chunk: impl FnMut(&mut S, &mut Vec<u8>) -> Result<bool>,
    close: impl FnOnce(&mut S) -> Result<()>,
) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let read = loop {
        match read_chunk(stream, &mut bytes) {
            Ok(true) => continue,
            Ok(false) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    if let Err(e) = close(stream) {
        tracing::warn!(error = %e, "stream close failed");
    }

    read.map(|()| bytes)
}

#[cfg(test)]
mod tests {
    use webshell_core::error::ShellError;

    use super::*;

    /// Serves `chunks` in order, failing at `fail_at` when set.
    struct ChunkSource {
        chunks: Vec<&'static [u8]>,
        next: usize,
        fail_at: Option<usize>,
        closed: usize,
    }

    impl ChunkSource {
        fn new(chunks: Vec<&'static [u8]>, fail_at: Option<usize>) -> Self {
            Self {
                chunks,
                next: 0,
                fail_at,
                closed: 0,
            }
        }

        fn read(&mut self, out: &mut Vec<u8>) -> Result<bool> {
            if self.fail_at == Some(self.next) {
                return Err(ShellError::Bridge("InputStream.read: IOException".into()));
            }
            match self.chunks.get(self.next) {
                Some(chunk) => {
                    out.extend_from_slice(chunk);
                    self.next += 1;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[test]
    fn reads_every_chunk_and_closes_once() {
        let mut source = ChunkSource::new(vec![b"<html>", b"</html>"], None);
        let bytes = drain_and_close(
            &mut source,
            |s, out| s.read(out),
            |s| {
                s.closed += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(bytes, b"<html></html>");
        assert_eq!(source.closed, 1);
    }

    #[test]
    fn failed_read_still_closes_the_stream() {
        let mut source = ChunkSource::new(vec![b"abc", b"def"], Some(1));
        let result = drain_and_close(
            &mut source,
            |s, out| s.read(out),
            |s| {
                s.closed += 1;
                Ok(())
            },
        );
        assert!(matches!(result, Err(ShellError::Bridge(_))));
        assert_eq!(source.closed, 1);
    }

    #[test]
    fn close_failure_keeps_the_bytes() {
        let mut source = ChunkSource::new(vec![b"body"], None);
        let bytes = drain_and_close(
            &mut source,
            |s, out| s.read(out),
            |_| Err(ShellError::Bridge("InputStream.close".into())),
        )
        .unwrap();
        assert_eq!(bytes, b"body");
    }
}
