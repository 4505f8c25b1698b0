// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The shell: one named method per browser-control callback.
//
// Every error is recovered here: it becomes a notice and/or a log line and
// the embedded view stays usable. Nothing is retried; the user re-triggers
// the original action.

use tracing::{debug, error, info, warn};
use webshell_bridge::traits::PlatformBridge;
use webshell_core::config::ShellConfig;
use webshell_core::error::{Result, ShellError};
use webshell_core::human_errors::humanize_error;
use webshell_core::types::{
    AfterSave, AssetResponse, BackAction, ConsoleLevel, DestinationPolicy, DownloadOutcome,
    DownloadRequest, NavigationDecision, NoticeDuration, PDF_MIME, ResourceRequest, SavedDownload,
};
use webshell_download::{AuthorizationGate, Clock, DownloadBridge, SystemClock};
use webshell_navigation::NavigationPolicy;
use webshell_navigation::policy::{back_action, load_error_notice};

/// What became of one download notification.
#[derive(Debug)]
pub enum DownloadAttempt {
    /// Storage access was missing; a grant request went out and nothing was
    /// written.
    GrantRequested,
    Finished {
        outcome: DownloadOutcome,
        /// Result of handing the file to a viewer, when `AfterSave::OpenViewer`
        /// is configured and the file was saved.
        viewer: Option<Result<()>>,
    },
}

pub struct Shell {
    config: ShellConfig,
    platform: Box<dyn PlatformBridge>,
    navigation: NavigationPolicy,
    downloads: DownloadBridge,
    gate: AuthorizationGate,
}

impl Shell {
    pub fn new(config: ShellConfig, platform: Box<dyn PlatformBridge>) -> Result<Self> {
        Self::with_clock(config, platform, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: ShellConfig,
        platform: Box<dyn PlatformBridge>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let gate = AuthorizationGate::new(platform.as_ref());
        let navigation = NavigationPolicy::from_config(&config);
        let downloads =
            DownloadBridge::with_clock(config.file_prefix.clone(), config.destination, clock);

        info!(
            platform = platform.platform_name(),
            start_url = %config.start_url(),
            destination = ?config.destination,
            after_save = ?config.after_save,
            "shell initialised"
        );

        Ok(Self {
            config,
            platform,
            navigation,
            downloads,
            gate,
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn platform(&self) -> &dyn PlatformBridge {
        self.platform.as_ref()
    }

    /// URL the browser control loads first.
    pub fn start_url(&self) -> String {
        self.config.start_url()
    }

    // -- Downloads -----------------------------------------------------------

    /// Download notification: `(url, user_agent, content_disposition,
    /// mime_type, content_length)`.
    pub fn on_download_start(
        &self,
        url: &str,
        user_agent: &str,
        content_disposition: &str,
        mime_type: &str,
        content_length: i64,
    ) -> DownloadAttempt {
        let request = DownloadRequest::from_notification(
            url,
            user_agent,
            content_disposition,
            mime_type,
            content_length,
        );
        self.download(&request)
    }

    pub fn download(&self, request: &DownloadRequest) -> DownloadAttempt {
        if let Err(e) = self.gate.authorize(self.platform.as_ref()) {
            info!(error = %e, "download abandoned until storage access is granted");
            return DownloadAttempt::GrantRequested;
        }

        let outcome = self.downloads.handle_download(request, self.platform.as_ref());
        let viewer = match &outcome {
            DownloadOutcome::Saved(saved) => self.after_save(saved),
            DownloadOutcome::Ignored => {
                debug!(
                    error = %ShellError::UnsupportedScheme(scheme_of(&request.source).into()),
                    "download ignored"
                );
                None
            }
            DownloadOutcome::Failed(e) => {
                self.report(e);
                None
            }
        };

        DownloadAttempt::Finished { outcome, viewer }
    }

    fn after_save(&self, saved: &SavedDownload) -> Option<Result<()>> {
        match self.config.after_save {
            AfterSave::Notify => {
                let place = match self.downloads.destination() {
                    DestinationPolicy::PublicDownloads => "Downloads",
                    DestinationPolicy::AppPrivateDownloads => "app storage",
                };
                self.platform.show_notice(
                    &format!("Saved to {place}: {}", saved.file_name()),
                    NoticeDuration::Long,
                );
                None
            }
            AfterSave::OpenViewer => {
                let opened = self.platform.open_file(&saved.path, PDF_MIME);
                if let Err(e) = &opened {
                    self.report(e);
                }
                Some(opened)
            }
        }
    }

    // -- Navigation ----------------------------------------------------------

    pub fn navigate(&self, request: &ResourceRequest) -> NavigationDecision {
        self.navigation.decide(request, self.platform.as_ref())
    }

    /// Request interception hook: `Some` replaces the network fetch.
    pub fn intercept_request(&self, url: &str, is_main_frame: bool) -> Option<AssetResponse> {
        let request = ResourceRequest {
            url: url.to_owned(),
            is_main_frame,
        };
        match self.navigate(&request) {
            NavigationDecision::ServeLocal(response) => Some(response),
            NavigationDecision::HandleExternally(_) | NavigationDecision::AllowInPlace => None,
        }
    }

    /// Top-level navigation hook. Returns `true` when the shell consumed the
    /// navigation and the view must not load it.
    pub fn override_url_loading(&self, url: &str) -> bool {
        match self.navigate(&ResourceRequest::main_frame(url)) {
            NavigationDecision::HandleExternally(target) => {
                if let Err(e) = self.platform.open_uri(&target) {
                    self.report(&e);
                }
                true
            }
            NavigationDecision::ServeLocal(_) | NavigationDecision::AllowInPlace => false,
        }
    }

    /// A resource failed to load. Non-fatal.
    pub fn on_received_error(&self, description: &str, failing_url: &str) {
        warn!(failing_url, description, "resource failed to load");
        self.platform
            .show_notice(&load_error_notice(description), NoticeDuration::Short);
    }

    pub fn on_back_pressed(&self, can_go_back: bool) -> BackAction {
        back_action(can_go_back)
    }

    /// Page console output, forwarded into the log.
    pub fn on_console_message(&self, level: ConsoleLevel, message: &str, source: &str, line: u32) {
        match level {
            ConsoleLevel::Error => {
                error!(target: "webshell::console", source, line, "{message}")
            }
            ConsoleLevel::Warning => {
                warn!(target: "webshell::console", source, line, "{message}")
            }
            ConsoleLevel::Log => info!(target: "webshell::console", source, line, "{message}"),
            ConsoleLevel::Debug => {
                debug!(target: "webshell::console", source, line, "{message}")
            }
        }
    }

    // -- Reporting -----------------------------------------------------------

    fn report(&self, err: &ShellError) {
        let human = humanize_error(err);
        warn!(error = %err, severity = ?human.severity, "shell operation failed");
        if let Some(notice) = human.notice() {
            self.platform.show_notice(&notice, human.duration());
        }
    }
}

fn scheme_of(source: &str) -> &str {
    source.split_once(':').map(|(scheme, _)| scheme).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use webshell_bridge::traits::*;

    use super::*;

    /// Calls observed by the fake platform.
    #[derive(Default)]
    struct Recorder {
        grant_requests: AtomicUsize,
        has_grant_checks: AtomicUsize,
        notices: Mutex<Vec<String>>,
        opened_files: Mutex<Vec<(PathBuf, String)>>,
        opened_uris: Mutex<Vec<String>>,
    }

    /// Storage lives in a temp dir; every call lands in the shared recorder.
    struct FakePlatform {
        root: PathBuf,
        explicit_grant: bool,
        granted: bool,
        viewer_installed: bool,
        log: Arc<Recorder>,
    }

    impl FakePlatform {
        fn new(root: &Path) -> Self {
            Self {
                root: root.to_path_buf(),
                explicit_grant: false,
                granted: true,
                viewer_installed: true,
                log: Arc::default(),
            }
        }
    }

    impl PlatformBridge for FakePlatform {
        fn platform_name(&self) -> &str {
            "Fake"
        }
    }

    impl StorageAuthorization for FakePlatform {
        fn requires_explicit_storage_grant(&self) -> bool {
            self.explicit_grant
        }

        fn has_storage_grant(&self) -> bool {
            self.log.has_grant_checks.fetch_add(1, Ordering::SeqCst);
            self.granted
        }

        fn request_storage_grant(&self) -> Result<()> {
            self.log.grant_requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl StorageLocations for FakePlatform {
        fn public_downloads_dir(&self) -> Result<PathBuf> {
            Ok(self.root.join("Download"))
        }

        fn private_downloads_dir(&self) -> Result<PathBuf> {
            Ok(self.root.join("private").join("Download"))
        }
    }

    impl ExternalViewer for FakePlatform {
        fn open_file(&self, path: &Path, mime_type: &str) -> Result<()> {
            if !self.viewer_installed {
                return Err(ShellError::NoViewerAvailable(path.display().to_string()));
            }
            self.log
                .opened_files
                .lock()
                .unwrap()
                .push((path.to_path_buf(), mime_type.to_owned()));
            Ok(())
        }

        fn open_uri(&self, uri: &str) -> Result<()> {
            self.log.opened_uris.lock().unwrap().push(uri.to_owned());
            Ok(())
        }
    }

    impl UserNotice for FakePlatform {
        fn show_notice(&self, message: &str, _duration: NoticeDuration) {
            self.log.notices.lock().unwrap().push(message.to_owned());
        }
    }

    impl AssetBundle for FakePlatform {
        fn read_asset(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
            Ok((relative_path == "index.html").then(|| b"<div id=root></div>".to_vec()))
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    fn shell(config: ShellConfig, platform: FakePlatform) -> (Shell, Arc<Recorder>) {
        let log = Arc::clone(&platform.log);
        let shell = Shell::with_clock(
            config,
            Box::new(platform),
            Box::new(FixedClock(1_700_000_000_000)),
        )
        .unwrap();
        (shell, log)
    }

    const HELLO_PDF: &str = "data:application/pdf;base64,SGVsbG8=";

    #[test]
    fn saves_and_confirms_with_notice() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        let attempt = shell.on_download_start(HELLO_PDF, "Mozilla/5.0", "", "application/pdf", -1);

        let saved = match attempt {
            DownloadAttempt::Finished {
                outcome: DownloadOutcome::Saved(saved),
                viewer: None,
            } => saved,
            other => panic!("expected a saved download, got {other:?}"),
        };
        assert_eq!(saved.path, tmp.path().join("Download/Recibo_1700000000000.pdf"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"Hello");
        assert_eq!(
            log.notices.lock().unwrap().as_slice(),
            ["Saved to Downloads: Recibo_1700000000000.pdf"]
        );
    }

    #[test]
    fn viewer_mode_opens_saved_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            after_save: AfterSave::OpenViewer,
            ..ShellConfig::default()
        };
        let (shell, log) = shell(config, FakePlatform::new(tmp.path()));

        let attempt = shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);

        assert!(matches!(
            attempt,
            DownloadAttempt::Finished { outcome: DownloadOutcome::Saved(_), viewer: Some(Ok(())) }
        ));
        let opened = log.opened_files.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].1, PDF_MIME);
        assert!(log.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_viewer_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            after_save: AfterSave::OpenViewer,
            ..ShellConfig::default()
        };
        let mut platform = FakePlatform::new(tmp.path());
        platform.viewer_installed = false;
        let (shell, log) = shell(config, platform);

        let attempt = shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);

        assert!(matches!(
            attempt,
            DownloadAttempt::Finished {
                outcome: DownloadOutcome::Saved(_),
                viewer: Some(Err(ShellError::NoViewerAvailable(_)))
            }
        ));
        assert_eq!(log.notices.lock().unwrap().len(), 1);
        // The session carries on.
        assert!(shell.intercept_request(&shell.start_url(), true).is_some());
    }

    #[test]
    fn denied_authorization_requests_once_and_skips_download() {
        let tmp = tempfile::tempdir().unwrap();
        let mut platform = FakePlatform::new(tmp.path());
        platform.explicit_grant = true;
        platform.granted = false;
        let (shell, log) = shell(ShellConfig::default(), platform);

        let attempt = shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);

        assert!(matches!(attempt, DownloadAttempt::GrantRequested));
        assert_eq!(log.grant_requests.load(Ordering::SeqCst), 1);
        assert!(!tmp.path().join("Download").exists());

        shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);
        assert_eq!(log.grant_requests.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn scoped_storage_never_polls_the_grant() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);

        assert_eq!(log.has_grant_checks.load(Ordering::SeqCst), 0);
        assert_eq!(log.grant_requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remote_download_is_silently_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        let attempt =
            shell.on_download_start("https://example.com/file.pdf", "", "", "application/pdf", 10);

        assert!(matches!(
            attempt,
            DownloadAttempt::Finished { outcome: DownloadOutcome::Ignored, viewer: None }
        ));
        assert!(log.notices.lock().unwrap().is_empty());
        assert!(!tmp.path().join("Download").exists());
    }

    #[test]
    fn decode_failure_shows_a_notice() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        let attempt =
            shell.on_download_start("data:application/pdf;base64,***", "", "", "", -1);

        assert!(matches!(
            attempt,
            DownloadAttempt::Finished { outcome: DownloadOutcome::Failed(ShellError::Decode(_)), .. }
        ));
        assert_eq!(log.notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn private_destination_is_honoured() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            destination: DestinationPolicy::AppPrivateDownloads,
            file_prefix: "OS".into(),
            ..ShellConfig::default()
        };
        let (shell, log) = shell(config, FakePlatform::new(tmp.path()));

        shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5);

        assert!(tmp.path().join("private/Download/OS_1700000000000.pdf").exists());
        assert_eq!(
            log.notices.lock().unwrap().as_slice(),
            ["Saved to app storage: OS_1700000000000.pdf"]
        );
    }

    #[test]
    fn assets_are_served_while_a_download_runs_on_another_thread() {
        fn assert_shareable<T: Send + Sync>() {}
        assert_shareable::<Shell>();

        let tmp = tempfile::tempdir().unwrap();
        let (shell, _log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));
        let start = shell.start_url();

        std::thread::scope(|scope| {
            let downloader = scope.spawn(|| {
                matches!(
                    shell.on_download_start(HELLO_PDF, "", "", "application/pdf", 5),
                    DownloadAttempt::Finished { outcome: DownloadOutcome::Saved(_), .. }
                )
            });
            for _ in 0..10 {
                assert!(shell.intercept_request(&start, false).is_some());
            }
            assert!(downloader.join().unwrap());
        });
    }

    #[test]
    fn start_page_is_served_locally() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, _log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        let response = shell
            .intercept_request("https://appassets.androidplatform.net/assets/index.html", true)
            .unwrap();
        assert_eq!(response.body, b"<div id=root></div>");
        assert!(shell.intercept_request("https://example.com/", true).is_none());
    }

    #[test]
    fn external_schemes_are_handed_off() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        assert!(shell.override_url_loading("mailto:loja@example.com"));
        assert!(!shell.override_url_loading("https://wa.me/5511999999999"));
        assert_eq!(
            log.opened_uris.lock().unwrap().as_slice(),
            ["mailto:loja@example.com"]
        );
    }

    #[test]
    fn load_errors_become_notices() {
        let tmp = tempfile::tempdir().unwrap();
        let (shell, log) = shell(ShellConfig::default(), FakePlatform::new(tmp.path()));

        shell.on_received_error("net::ERR_INTERNET_DISCONNECTED", "https://api.example.com/sync");

        assert_eq!(
            log.notices.lock().unwrap().as_slice(),
            ["Error: net::ERR_INTERNET_DISCONNECTED"]
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            file_prefix: String::new(),
            ..ShellConfig::default()
        };
        let result = Shell::new(config, Box::new(FakePlatform::new(tmp.path())));
        assert!(matches!(result, Err(ShellError::Config(_))));
    }
}
