// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download bridge: turns a download notification into a file on disk.
//
// Only inline `data:` URIs are handled. Remote URLs are ignored: the browser
// control's own download manager is not wired in, and fetching them here
// would mean carrying a network stack.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};
use webshell_bridge::traits::StorageLocations;
use webshell_core::error::Result;
use webshell_core::types::{DestinationPolicy, DownloadOutcome, DownloadRequest, SavedDownload};

use crate::data_uri::DataUri;
use crate::integrity::hash_bytes;
use crate::naming::{Clock, FileNamer, SystemClock};
use crate::writer::write_unique;

/// Decodes and persists `data:` downloads.
pub struct DownloadBridge {
    namer: FileNamer,
    destination: DestinationPolicy,
    clock: Box<dyn Clock>,
}

impl DownloadBridge {
    pub fn new(file_prefix: impl Into<String>, destination: DestinationPolicy) -> Self {
        Self::with_clock(file_prefix, destination, Box::new(SystemClock))
    }

    pub fn with_clock(
        file_prefix: impl Into<String>,
        destination: DestinationPolicy,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            namer: FileNamer::new(file_prefix),
            destination,
            clock,
        }
    }

    pub fn destination(&self) -> DestinationPolicy {
        self.destination
    }

    /// Handle one download notification.
    ///
    /// The caller has already passed the authorization gate. Nothing touches
    /// the filesystem unless the source is a `data:` URI whose payload
    /// decodes cleanly.
    #[instrument(skip_all, fields(mime = %request.mime_type))]
    pub fn handle_download<L: StorageLocations + ?Sized>(
        &self,
        request: &DownloadRequest,
        locations: &L,
    ) -> DownloadOutcome {
        if !request.is_data_uri() {
            debug!(
                source = %truncate(&request.source, 80),
                "not a data: URI, download ignored"
            );
            return DownloadOutcome::Ignored;
        }

        match self.save(request, locations) {
            Ok(saved) => DownloadOutcome::Saved(saved),
            Err(e) => {
                warn!(error = %e, "download failed");
                DownloadOutcome::Failed(e)
            }
        }
    }

    fn save<L: StorageLocations + ?Sized>(
        &self,
        request: &DownloadRequest,
        locations: &L,
    ) -> Result<SavedDownload> {
        let uri = DataUri::parse(&request.source)?;
        let bytes = uri.decode()?;

        if let Some(declared) = request.content_length {
            if declared != bytes.len() as u64 {
                debug!(declared, decoded = bytes.len(), "declared length differs from payload");
            }
        }

        let dir = self.resolve_dir(locations)?;
        let millis = self.clock.now_millis();
        let path = write_unique(&dir, &self.namer, millis, &bytes)?;
        let sha256 = hash_bytes(&bytes);

        info!(
            path = %path.display(),
            bytes = bytes.len(),
            media_type = uri.media_type().unwrap_or("unspecified"),
            sha256 = %sha256,
            "download saved"
        );

        Ok(SavedDownload {
            path,
            bytes: bytes.len(),
            sha256,
        })
    }

    fn resolve_dir<L: StorageLocations + ?Sized>(&self, locations: &L) -> Result<PathBuf> {
        match self.destination {
            DestinationPolicy::PublicDownloads => locations.public_downloads_dir(),
            DestinationPolicy::AppPrivateDownloads => locations.private_downloads_dir(),
        }
    }
}

/// Data URIs run to megabytes; keep log lines short.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicI64, Ordering};

    use webshell_core::error::ShellError;

    use super::*;

    struct TempLocations {
        public: PathBuf,
        private: PathBuf,
    }

    impl TempLocations {
        fn new(root: &Path) -> Self {
            Self {
                public: root.join("Download"),
                private: root.join("files").join("Download"),
            }
        }
    }

    impl StorageLocations for TempLocations {
        fn public_downloads_dir(&self) -> Result<PathBuf> {
            Ok(self.public.clone())
        }

        fn private_downloads_dir(&self) -> Result<PathBuf> {
            Ok(self.private.clone())
        }
    }

    /// Returns `start`, `start + 1`, ... on successive calls.
    struct StepClock(AtomicI64);

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    const HELLO_PDF: &str = "data:application/pdf;base64,SGVsbG8=";

    #[test]
    fn saves_hello_as_recibo_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::with_clock(
            "Recibo",
            DestinationPolicy::PublicDownloads,
            Box::new(FixedClock(1_700_000_000_000)),
        );

        let outcome = bridge.handle_download(
            &DownloadRequest::from_source(HELLO_PDF, "application/pdf"),
            &locations,
        );

        let saved = match outcome {
            DownloadOutcome::Saved(saved) => saved,
            other => panic!("expected Saved, got {other:?}"),
        };
        assert_eq!(saved.path, locations.public.join("Recibo_1700000000000.pdf"));
        assert_eq!(saved.file_name(), "Recibo_1700000000000.pdf");
        assert_eq!(saved.bytes, 5);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"Hello");
        assert_eq!(saved.sha256, hash_bytes(b"Hello"));
    }

    #[test]
    fn remote_url_is_ignored_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::new("Recibo", DestinationPolicy::PublicDownloads);

        let outcome = bridge.handle_download(
            &DownloadRequest::from_source("https://example.com/file.pdf", "application/pdf"),
            &locations,
        );

        assert!(outcome.is_ignored());
        assert!(!locations.public.exists());
    }

    #[test]
    fn malformed_payload_fails_and_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::new("Recibo", DestinationPolicy::PublicDownloads);

        for source in [
            "data:application/pdf;base64,@@@@",
            "data:application/pdf;base64,SGVsbG8=!",
            "data:application/pdf;base64",
        ] {
            let outcome =
                bridge.handle_download(&DownloadRequest::from_source(source, ""), &locations);
            assert!(
                matches!(outcome, DownloadOutcome::Failed(ShellError::Decode(_))),
                "{source}: {outcome:?}"
            );
        }
        assert_eq!(file_count(&locations.public), 0);
    }

    #[test]
    fn distinct_timestamps_produce_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::with_clock(
            "OS",
            DestinationPolicy::PublicDownloads,
            Box::new(StepClock(AtomicI64::new(100))),
        );
        let request = DownloadRequest::from_source(HELLO_PDF, "application/pdf");

        let a = bridge.handle_download(&request, &locations);
        let b = bridge.handle_download(&request, &locations);

        match (a, b) {
            (DownloadOutcome::Saved(a), DownloadOutcome::Saved(b)) => {
                assert_eq!(a.file_name(), "OS_100.pdf");
                assert_eq!(b.file_name(), "OS_101.pdf");
            }
            other => panic!("expected two saves, got {other:?}"),
        }
        assert_eq!(file_count(&locations.public), 2);
    }

    #[test]
    fn identical_timestamps_do_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::with_clock(
            "Recibo",
            DestinationPolicy::PublicDownloads,
            Box::new(FixedClock(9)),
        );

        let first = bridge.handle_download(
            &DownloadRequest::from_source("data:application/pdf;base64,b25l", ""),
            &locations,
        );
        let second = bridge.handle_download(
            &DownloadRequest::from_source("data:application/pdf;base64,dHdv", ""),
            &locations,
        );

        assert!(first.is_saved() && second.is_saved());
        assert_eq!(std::fs::read(locations.public.join("Recibo_9.pdf")).unwrap(), b"one");
        assert_eq!(std::fs::read(locations.public.join("Recibo_9_1.pdf")).unwrap(), b"two");
    }

    #[test]
    fn private_destination_uses_app_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::with_clock(
            "Recibo",
            DestinationPolicy::AppPrivateDownloads,
            Box::new(FixedClock(1)),
        );

        let outcome =
            bridge.handle_download(&DownloadRequest::from_source(HELLO_PDF, ""), &locations);

        assert!(outcome.is_saved());
        assert!(locations.private.join("Recibo_1.pdf").exists());
        assert!(!locations.public.exists());
    }

    #[test]
    fn unwritable_destination_is_an_io_failure() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the Downloads directory should be.
        let blocker = tmp.path().join("Download");
        std::fs::write(&blocker, b"").unwrap();
        let locations = TempLocations::new(tmp.path());
        let bridge = DownloadBridge::new("Recibo", DestinationPolicy::PublicDownloads);

        let outcome =
            bridge.handle_download(&DownloadRequest::from_source(HELLO_PDF, ""), &locations);

        assert!(matches!(outcome, DownloadOutcome::Failed(ShellError::Io(_))));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ação", 2), "aç");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
