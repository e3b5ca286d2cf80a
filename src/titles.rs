// ABOUTME: Page-title capture: off-screen resolver surfaces and the pending-title backfill
// ABOUTME: Resolved titles patch hostname-derived names in the launcher's saved-link list

use crate::app::ShellEvent;
use crate::router;
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::thread;
use std::time::Duration;
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use url::Url;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

/// How long a resolver surface may keep looking for a title.
pub const RESOLVE_TIMEOUT_MS: u64 = 2500;

/// Canonical form used as the pending-title key.
pub fn normalize_url(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.to_string())
}

/// Mechanical link name from a URL's hostname: `www.` stripped, the
/// second-level label chosen when more than two labels exist, title-cased.
pub fn derive_name(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    let core = if labels.len() > 2 {
        labels[labels.len() - 2]
    } else {
        labels[0]
    };
    titleize(core)
}

fn titleize(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Titles observed for external pages, keyed by normalized URL, waiting to
/// be injected into the launcher's saved-link list. Drained exactly once
/// per successful injection.
#[derive(Debug, Default)]
pub struct PendingTitles {
    map: BTreeMap<String, String>,
}

impl PendingTitles {
    /// Record a title for a non-local URL, overwriting any prior entry.
    pub fn record(&mut self, url: &str, title: &str) {
        let title = title.trim();
        if title.is_empty() || crate::pages::is_app_url(url) {
            return;
        }
        if let Some(key) = normalize_url(url) {
            self.map.insert(key, title.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn get(&self, normalized_url: &str) -> Option<&str> {
        self.map.get(normalized_url).map(String::as_str)
    }

    /// One-shot script run against the launcher document: rewrites the
    /// name of each saved link whose name is empty or still equals the
    /// hostname-derived form. Evaluates to `true` only when the list was
    /// read and written without error, so the caller can clear the map
    /// on success alone.
    pub fn injection_script(&self) -> Option<String> {
        if self.map.is_empty() {
            return None;
        }
        let pending = serde_json::to_string(&self.map).ok()?;
        Some(format!(
            r#"(() => {{
  try {{
    const pending = {pending};
    const raw = localStorage.getItem('savedLinks');
    let links = raw ? JSON.parse(raw) : [];
    if (!Array.isArray(links)) return false;
    const titleize = (s) => (s || '').split(/[^a-zA-Z0-9]+/).filter(Boolean)
      .map((w) => w[0].toUpperCase() + w.slice(1)).join(' ');
    const derive = (href) => {{
      try {{
        const host = new URL(href).hostname.replace(/^www\./, '');
        const parts = host.split('.');
        return titleize(parts.length > 2 ? parts[parts.length - 2] : parts[0]);
      }} catch {{ return ''; }}
    }};
    const norm = (href) => {{ try {{ return new URL(href).toString(); }} catch {{ return ''; }} }};
    let changed = false;
    links = links.map((l) => {{
      const key = l && l.url ? norm(l.url) : '';
      const title = key ? pending[key] : '';
      if (title && (!l.name || l.name === derive(l.url))) {{ l.name = title; changed = true; }}
      return l;
    }});
    if (changed) localStorage.setItem('savedLinks', JSON.stringify(links));
    return true;
  }} catch {{ return false; }}
}})()"#
        ))
    }
}

/// The resolver's three-way race between a title notification, load
/// completion, and the timeout. First non-empty title wins; expiry
/// resolves to the empty string. Transitions after resolution are no-ops.
#[derive(Debug, Default)]
pub struct TitleRace {
    resolved: bool,
}

impl TitleRace {
    pub fn observe_title(&mut self, title: &str) -> Option<String> {
        if self.resolved {
            return None;
        }
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        self.resolved = true;
        Some(title.to_string())
    }

    pub fn expire(&mut self) -> Option<String> {
        if self.resolved {
            return None;
        }
        self.resolved = true;
        Some(String::new())
    }
}

struct InflightResolve {
    webview: WebView,
    reply_id: u64,
    race: TitleRace,
}

/// Off-screen, hidden resolver surfaces in flight, keyed by an internal id
/// so stale callbacks after cleanup are ignored.
#[derive(Default)]
pub struct ResolverPool {
    next_id: u64,
    inflight: HashMap<u64, InflightResolve>,
}

impl ResolverPool {
    /// Start resolving `url` in a hidden surface with the same trust
    /// restrictions as the content surface. The caller must have already
    /// validated the URL with the navigation router.
    pub fn begin(
        &mut self,
        window: &Window,
        proxy: &EventLoopProxy<ShellEvent>,
        reply_id: u64,
        url: &str,
    ) -> Result<()> {
        let id = self.next_id;
        self.next_id += 1;

        let title_proxy = proxy.clone();
        let load_proxy = proxy.clone();
        let webview = WebViewBuilder::new()
            .with_bounds(Rect {
                position: LogicalPosition::new(0, 0).into(),
                size: LogicalSize::new(800, 600).into(),
            })
            .with_visible(false)
            .with_navigation_handler(|url| router::is_allowed(&url))
            .with_new_window_req_handler(|url| router::route_new_window(&url))
            .with_document_title_changed_handler(move |title| {
                let _ = title_proxy.send_event(ShellEvent::ResolverTitle { id, title });
            })
            .with_on_page_load_handler(move |event, _url| {
                if matches!(event, PageLoadEvent::Finished) {
                    let _ = load_proxy.send_event(ShellEvent::ResolverFinished { id });
                }
            })
            .with_url(url)
            .build_as_child(window)?;

        let timeout_proxy = proxy.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(RESOLVE_TIMEOUT_MS));
            let _ = timeout_proxy.send_event(ShellEvent::ResolverTimeout { id });
        });

        self.inflight.insert(
            id,
            InflightResolve {
                webview,
                reply_id,
                race: TitleRace::default(),
            },
        );
        Ok(())
    }

    /// A title notification from resolver `id`. Returns the reply id and
    /// resolved title when this completes the race; the surface is
    /// destroyed on completion.
    pub fn on_title(&mut self, id: u64, title: &str) -> Option<(u64, String)> {
        let entry = self.inflight.get_mut(&id)?;
        let resolved = entry.race.observe_title(title)?;
        let reply_id = entry.reply_id;
        self.inflight.remove(&id);
        Some((reply_id, resolved))
    }

    /// Load finished without a title notification yet; fall back to
    /// reading whatever title the document currently has.
    pub fn on_finished(&mut self, id: u64, proxy: &EventLoopProxy<ShellEvent>) {
        let Some(entry) = self.inflight.get(&id) else {
            return;
        };
        let read_proxy = proxy.clone();
        let _ = entry.webview.evaluate_script_with_callback("document.title", move |result| {
            let title = serde_json::from_str::<String>(&result).unwrap_or_default();
            let _ = read_proxy.send_event(ShellEvent::ResolverTitle { id, title });
        });
    }

    /// The 2.5s timer elapsed. Resolves to the empty string unless a
    /// title already won the race.
    pub fn on_timeout(&mut self, id: u64) -> Option<(u64, String)> {
        let entry = self.inflight.get_mut(&id)?;
        let resolved = entry.race.expire()?;
        let reply_id = entry.reply_id;
        self.inflight.remove(&id);
        Some((reply_id, resolved))
    }
}
