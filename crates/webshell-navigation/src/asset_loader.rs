// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Virtual-origin asset loader.
//
// `https://<virtual origin><prefix><path>` is answered from the asset bundle
// instead of the network. The bundled app then runs on a real HTTPS origin,
// which module loaders require; `file://` pages get an opaque origin and are
// refused cross-file script imports.

use tracing::{debug, instrument, warn};
use url::Url;
use webshell_bridge::traits::AssetBundle;
use webshell_core::types::AssetResponse;

use crate::mime;

/// Maps one path prefix of the virtual origin onto the asset bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualOriginLoader {
    host: String,
    prefix: String,
}

impl VirtualOriginLoader {
    /// `prefix` must start and end with `/` (checked by `ShellConfig::validate`).
    pub fn new(host: &str, prefix: &str) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            prefix: prefix.to_owned(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether `url` addresses the virtual origin (any path).
    pub fn is_virtual_origin(&self, url: &Url) -> bool {
        url.scheme() == "https"
            && url.port().is_none()
            && url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }

    /// The still-encoded path below the prefix, if `url` is under it.
    pub fn asset_path<'u>(&self, url: &'u Url) -> Option<&'u str> {
        if !self.is_virtual_origin(url) {
            return None;
        }
        url.path().strip_prefix(self.prefix.as_str())
    }

    /// Answer a request for the virtual origin from `bundle`.
    ///
    /// Returns `None` for URLs outside the prefix. Inside it, a missing or
    /// unsafe path is a 404, never a network fetch.
    #[instrument(skip_all, fields(url = %url))]
    pub fn load<B: AssetBundle + ?Sized>(&self, url: &Url, bundle: &B) -> Option<AssetResponse> {
        let encoded = self.asset_path(url)?;

        let Some(relative) = sanitize(encoded) else {
            debug!("rejected asset path");
            return Some(AssetResponse::not_found());
        };

        let response = match bundle.read_asset(&relative) {
            Ok(Some(body)) => {
                let (mime_type, encoding) = mime::guess(&relative);
                debug!(asset = %relative, bytes = body.len(), mime_type, "serving bundled asset");
                AssetResponse::ok(mime_type, encoding, body)
            }
            Ok(None) => {
                warn!(asset = %relative, "bundled asset not found");
                AssetResponse::not_found()
            }
            Err(e) => {
                warn!(asset = %relative, error = %e, "bundled asset unreadable");
                AssetResponse::not_found()
            }
        };
        Some(response)
    }
}

/// Percent-decode and validate a path relative to the bundle root.
///
/// Rejects empty paths, directory paths, and any `.`/`..`/empty segment so
/// nothing outside the bundle can be named.
fn sanitize(encoded: &str) -> Option<String> {
    let decoded = urlencoding::decode(encoded).ok()?;
    if decoded.is_empty() || decoded.contains('\\') || decoded.contains('\0') {
        return None;
    }
    let safe = decoded
        .split('/')
        .all(|segment| !matches!(segment, "" | "." | ".."));
    safe.then(|| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use webshell_core::error::{Result, ShellError};

    use super::*;

    struct MapBundle(HashMap<&'static str, &'static [u8]>);

    impl AssetBundle for MapBundle {
        fn read_asset(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
            if relative_path == "broken.js" {
                return Err(ShellError::Bridge("asset manager closed".into()));
            }
            Ok(self.0.get(relative_path).map(|b| b.to_vec()))
        }
    }

    fn bundle() -> MapBundle {
        MapBundle(HashMap::from([
            ("index.html", &b"<!doctype html>"[..]),
            ("js/app.js", &b"import './x.js'"[..]),
            ("img/my logo.png", &b"\x89PNG"[..]),
        ]))
    }

    fn loader() -> VirtualOriginLoader {
        VirtualOriginLoader::new("appassets.androidplatform.net", "/assets/")
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn serves_index_from_bundle() {
        let response = loader()
            .load(&url("https://appassets.androidplatform.net/assets/index.html"), &bundle())
            .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.mime_type, "text/html");
        assert_eq!(response.encoding, Some("utf-8"));
        assert_eq!(response.body, b"<!doctype html>");
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        let response = loader()
            .load(
                &url("https://appassets.androidplatform.net/assets/js/app.js?v=3#top"),
                &bundle(),
            )
            .unwrap();
        assert_eq!(response.mime_type, "text/javascript");
    }

    #[test]
    fn percent_encoded_segments_are_decoded() {
        let response = loader()
            .load(
                &url("https://appassets.androidplatform.net/assets/img/my%20logo.png"),
                &bundle(),
            )
            .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.encoding, None);
    }

    #[test]
    fn missing_asset_is_404_not_network() {
        let response = loader()
            .load(&url("https://appassets.androidplatform.net/assets/nope.css"), &bundle())
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn unreadable_asset_is_404() {
        let response = loader()
            .load(&url("https://appassets.androidplatform.net/assets/broken.js"), &bundle())
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn traversal_is_rejected() {
        // The URL parser collapses dot segments; an encoded slash survives it.
        let response = loader()
            .load(
                &url("https://appassets.androidplatform.net/assets/..%2Fsecret"),
                &bundle(),
            )
            .unwrap();
        assert_eq!(response.status, 404);
        let response = loader()
            .load(&url("https://appassets.androidplatform.net/assets/"), &bundle())
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn other_origins_and_prefixes_are_not_handled() {
        let bundle = bundle();
        let loader = loader();
        assert!(loader.load(&url("https://example.com/assets/index.html"), &bundle).is_none());
        assert!(
            loader
                .load(&url("http://appassets.androidplatform.net/assets/index.html"), &bundle)
                .is_none()
        );
        assert!(
            loader
                .load(&url("https://appassets.androidplatform.net/res/index.html"), &bundle)
                .is_none()
        );
        assert!(
            loader
                .load(&url("https://appassets.androidplatform.net:8443/assets/index.html"), &bundle)
                .is_none()
        );
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert!(loader().is_virtual_origin(&url("https://AppAssets.AndroidPlatform.net/")));
    }
}
