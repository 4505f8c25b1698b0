// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webshell desktop harness.
//
// Drives the same `Shell` the Android host uses, from the command line:
//
//   webshell start-url              print the first page the view loads
//   webshell resolve <url>          show how a navigation would be handled
//   webshell download <uri> [mime]  run a download notification end to end

use std::process::ExitCode;

#[cfg(not(target_os = "android"))]
use webshell_app::services::settings::load_config_or_default;
#[cfg(not(target_os = "android"))]
use webshell_app::{DownloadAttempt, Shell};
#[cfg(not(target_os = "android"))]
use webshell_bridge::desktop::DesktopBridge;
#[cfg(not(target_os = "android"))]
use webshell_core::types::{DownloadOutcome, NavigationDecision, PDF_MIME, ResourceRequest};

#[cfg(not(target_os = "android"))]
const USAGE: &str = "usage: webshell <start-url | resolve <url> | download <uri> [mime]>";

/// On Android the library is loaded by the host Activity; there is no CLI.
#[cfg(target_os = "android")]
fn main() -> ExitCode {
    eprintln!("webshell: the command-line harness runs on desktop only");
    ExitCode::FAILURE
}

#[cfg(not(target_os = "android"))]
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let bridge = DesktopBridge::from_env();
    let config = load_config_or_default(bridge.data_dir());
    let shell = match Shell::new(config, Box::new(bridge)) {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!(error = %e, "shell could not start");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(platform = shell.platform().platform_name(), "Webshell starting");

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["start-url"] => {
            println!("{}", shell.start_url());
            ExitCode::SUCCESS
        }
        ["resolve", url] => {
            resolve(&shell, url);
            ExitCode::SUCCESS
        }
        ["download", uri] => download(&shell, uri, PDF_MIME),
        ["download", uri, mime] => download(&shell, uri, mime),
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

#[cfg(not(target_os = "android"))]
fn resolve(shell: &Shell, url: &str) {
    match shell.navigate(&ResourceRequest::main_frame(url)) {
        NavigationDecision::ServeLocal(response) => println!(
            "serve-local {} {} {} ({} bytes)",
            response.status,
            response.reason,
            response.mime_type,
            response.body.len()
        ),
        NavigationDecision::HandleExternally(target) => println!("external {target}"),
        NavigationDecision::AllowInPlace => println!("in-place"),
    }
}

#[cfg(not(target_os = "android"))]
fn download(shell: &Shell, uri: &str, mime: &str) -> ExitCode {
    match shell.on_download_start(uri, "webshell-cli", "", mime, -1) {
        DownloadAttempt::GrantRequested => {
            println!("storage grant requested; run the download again once granted");
            ExitCode::FAILURE
        }
        DownloadAttempt::Finished { outcome, .. } => match outcome {
            DownloadOutcome::Saved(saved) => {
                println!("{} {}", saved.path.display(), saved.sha256);
                ExitCode::SUCCESS
            }
            DownloadOutcome::Ignored => {
                println!("ignored: only data: URIs are saved");
                ExitCode::SUCCESS
            }
            DownloadOutcome::Failed(e) => {
                eprintln!("download failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
