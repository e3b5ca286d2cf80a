// ABOUTME: Navigation policy for external content: http(s) only
// ABOUTME: Applied before any surface mutation, new-window request, or in-page navigation

use url::Url;

/// True only for syntactically valid URLs with an http or https scheme.
///
/// Anything fetched over the network is treated as hostile and confined to
/// these schemes; local shell documents are recognized separately by
/// `crate::pages::is_app_url` and never pass through this check.
pub fn is_allowed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Handle a new-window request from any surface: allowed URLs are handed
/// to the OS default browser, and the in-app window is always suppressed.
pub fn route_new_window(url: &str) -> bool {
    if is_allowed(url) {
        open::that_detached(url).ok();
    }
    // Never open a new in-app window.
    false
}
