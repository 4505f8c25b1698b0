// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigation policy.
//
// Rules, in order:
//   1. virtual origin + asset prefix      -> ServeLocal (bundle, never network)
//   2. main frame + non-web scheme listed  -> HandleExternally
//   3. anything else                       -> AllowInPlace
//
// Remote pages always stay inside the view; nothing is sent to an external
// browser.

use tracing::debug;
use url::Url;
use webshell_bridge::traits::AssetBundle;
use webshell_core::config::ShellConfig;
use webshell_core::types::{BackAction, NavigationDecision, ResourceRequest};

use crate::asset_loader::VirtualOriginLoader;

#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    loader: VirtualOriginLoader,
    external_schemes: Vec<String>,
}

impl NavigationPolicy {
    pub fn new(loader: VirtualOriginLoader, external_schemes: &[String]) -> Self {
        Self {
            loader,
            external_schemes: external_schemes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            VirtualOriginLoader::new(&config.virtual_origin, &config.asset_path_prefix),
            &config.external_schemes,
        )
    }

    pub fn loader(&self) -> &VirtualOriginLoader {
        &self.loader
    }

    /// Decide how the browser control should treat `request`.
    pub fn decide<B: AssetBundle + ?Sized>(
        &self,
        request: &ResourceRequest,
        bundle: &B,
    ) -> NavigationDecision {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                // The browser control shows its own error page for these.
                debug!(url = %request.url, error = %e, "unparseable URL allowed in place");
                return NavigationDecision::AllowInPlace;
            }
        };

        if let Some(response) = self.loader.load(&url, bundle) {
            return NavigationDecision::ServeLocal(response);
        }

        if request.is_main_frame && self.is_external_scheme(url.scheme()) {
            debug!(scheme = url.scheme(), "navigation handed to an external app");
            return NavigationDecision::HandleExternally(request.url.clone());
        }

        NavigationDecision::AllowInPlace
    }

    fn is_external_scheme(&self, scheme: &str) -> bool {
        // `Url` lowercases schemes when parsing.
        self.external_schemes.iter().any(|s| s == scheme)
    }
}

/// One-line notice for a resource that failed to load.
pub fn load_error_notice(description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        "Error: the page could not be loaded".into()
    } else {
        format!("Error: {description}")
    }
}

/// Back button: walk the view's history first, leave the app when it is empty.
pub fn back_action(can_go_back: bool) -> BackAction {
    if can_go_back {
        BackAction::GoBack
    } else {
        BackAction::Exit
    }
}
