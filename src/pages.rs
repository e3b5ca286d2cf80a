// ABOUTME: Embedded shell documents served over the beacon custom protocol
// ABOUTME: A stable origin keeps the launcher's localStorage saved-link list intact

use std::borrow::Cow;
use wry::http::{header::CONTENT_TYPE, Request, Response, StatusCode};

pub const PROTOCOL: &str = "beacon";

const LAUNCHER_HTML: &str = include_str!("ui/launcher.html");
const OVERLAY_HTML: &str = include_str!("ui/overlay.html");
const SETTINGS_HTML: &str = include_str!("ui/settings.html");

/// URL of an embedded document. Windows resolves custom protocols through
/// an http bridge; everywhere else the scheme is used directly.
pub fn app_url(page: &str) -> String {
    if cfg!(windows) {
        format!("http://{PROTOCOL}.localhost/{page}")
    } else {
        format!("{PROTOCOL}://localhost/{page}")
    }
}

pub fn launcher_url() -> String {
    app_url("launcher.html")
}

pub fn overlay_url() -> String {
    app_url("overlay.html")
}

pub fn settings_url() -> String {
    app_url("settings.html")
}

/// True for any document served by the shell itself. These are trusted
/// local pages, exempt from the external navigation policy.
pub fn is_app_url(url: &str) -> bool {
    url.starts_with(&format!("{PROTOCOL}://"))
        || url.starts_with(&format!("http://{PROTOCOL}.localhost"))
}

pub fn is_launcher_url(url: &str) -> bool {
    is_app_url(url) && url.ends_with("/launcher.html")
}

/// Protocol handler body: maps request paths to embedded documents.
pub fn respond(request: Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let path = request.uri().path().trim_start_matches('/');
    let body = match path {
        "launcher.html" | "" => Some(LAUNCHER_HTML),
        "overlay.html" => Some(OVERLAY_HTML),
        "settings.html" => Some(SETTINGS_HTML),
        _ => None,
    };
    match body {
        Some(html) => Response::builder()
            .header(CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Cow::Borrowed(html.as_bytes()))
            .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[] as &[u8]))),
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Cow::Borrowed(&[] as &[u8]))
            .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[] as &[u8]))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_urls_are_recognized_as_local() {
        assert!(is_app_url(&launcher_url()));
        assert!(is_app_url(&overlay_url()));
        assert!(is_app_url(&settings_url()));
    }

    #[test]
    fn test_external_urls_are_not_local() {
        assert!(!is_app_url("https://example.com"));
        assert!(!is_app_url("file:///tmp/x.html"));
    }

    #[test]
    fn test_launcher_url_detection() {
        assert!(is_launcher_url(&launcher_url()));
        assert!(!is_launcher_url(&settings_url()));
        assert!(!is_launcher_url("https://example.com/launcher.html"));
    }

    #[test]
    fn test_respond_serves_known_documents() {
        let req = Request::builder()
            .uri(format!("{PROTOCOL}://localhost/overlay.html"))
            .body(Vec::new())
            .unwrap();
        let resp = respond(req);
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.body().is_empty());
    }

    #[test]
    fn test_respond_404_for_unknown_paths() {
        let req = Request::builder()
            .uri(format!("{PROTOCOL}://localhost/missing.html"))
            .body(Vec::new())
            .unwrap();
        assert_eq!(respond(req).status(), StatusCode::NOT_FOUND);
    }
}
