// ABOUTME: Session state and event dispatch for the single shell window
// ABOUTME: All surface callbacks arrive here as named ShellEvents on the coordinator thread

use crate::compositor::Compositor;
use crate::hotkey::{self, KeyInput};
use crate::ipc::IpcMessage;
use crate::menu::{self, AppMenu};
use crate::settings::{self, Action, HotkeyMap};
use crate::titles::{PendingTitles, ResolverPool};
use crate::{pages, router};
use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;
use tao::event_loop::EventLoopProxy;
use tao::window::{Fullscreen, Window};
use tracing::{debug, warn};

/// Notifications delivered to the coordinator loop. Surface callbacks and
/// timers never touch state directly; they send one of these through the
/// event-loop proxy.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    Ipc(IpcMessage),
    Menu(String),
    PageTitleChanged { title: String },
    LauncherLoaded { url: String },
    ResolverTitle { id: u64, title: String },
    ResolverFinished { id: u64 },
    ResolverTimeout { id: u64 },
    BackfillFinished { ok: bool },
}

/// Window-level keyboard interception outcomes, checked before any key
/// reaches the focused surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    ToggleFullscreen,
    OpenMenu,
    ToggleDevTools,
}

/// Decide what a key-down does, in interception order: fullscreen, then
/// return-to-launcher, then devtools with the hardwired F12 fallback.
pub fn key_action(hotkeys: &HotkeyMap, input: &KeyInput) -> Option<KeyAction> {
    if hotkey::matches(input, hotkeys.get(Action::ToggleFullscreen)) {
        return Some(KeyAction::ToggleFullscreen);
    }
    if hotkey::matches(input, hotkeys.get(Action::OpenMenu)) {
        return Some(KeyAction::OpenMenu);
    }
    if hotkey::matches(input, hotkeys.get(Action::ToggleDevTools))
        || input.key.eq_ignore_ascii_case("F12")
    {
        return Some(KeyAction::ToggleDevTools);
    }
    None
}

/// Script delivering a Command Surface reply into a shell document.
fn resolve_script(id: u64, value: &Value) -> String {
    format!("window.__beacon && window.__beacon._resolve({id}, {value})")
}

/// Everything the running session owns: hotkeys, surfaces, pending
/// titles, and in-flight resolvers. Lifecycle is tied to the one window;
/// there are no process-wide globals.
pub struct ShellState {
    proxy: EventLoopProxy<ShellEvent>,
    settings_path: PathBuf,
    hotkeys: HotkeyMap,
    compositor: Compositor,
    menu: AppMenu,
    pending_titles: PendingTitles,
    resolvers: ResolverPool,
}

impl ShellState {
    pub fn new(window: &Window, proxy: EventLoopProxy<ShellEvent>) -> Result<Self> {
        let settings_path = settings::default_settings_path()?;
        let hotkeys = settings::load(&settings_path);
        let compositor = Compositor::new(window, proxy.clone())?;
        let menu = AppMenu::build(&hotkeys)?;
        menu.install(window)?;
        Ok(ShellState {
            proxy,
            settings_path,
            hotkeys,
            compositor,
            menu,
            pending_titles: PendingTitles::default(),
            resolvers: ResolverPool::default(),
        })
    }

    /// Resize/move of the owning window.
    pub fn reposition(&mut self, window: &Window) {
        if let Err(e) = self.compositor.reposition(window) {
            warn!("reposition failed: {e:#}");
        }
    }

    /// The owning window is closing; the process exits right after.
    pub fn on_window_closed(&mut self) {
        self.compositor.on_window_closed();
    }

    /// Window-level key interception. Returns true when the key was
    /// consumed by a shell action.
    pub fn handle_key_down(&mut self, window: &Window, input: &KeyInput) -> bool {
        match key_action(&self.hotkeys, input) {
            Some(KeyAction::ToggleFullscreen) => {
                let next = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(next);
                true
            }
            Some(KeyAction::OpenMenu) => {
                self.go_home();
                true
            }
            Some(KeyAction::ToggleDevTools) => {
                self.compositor.toggle_devtools();
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: ShellEvent) {
        let result = match event {
            ShellEvent::Ipc(msg) => self.handle_ipc(window, msg),
            ShellEvent::Menu(id) => self.handle_menu(window, &id),
            ShellEvent::PageTitleChanged { title } => {
                if let Some(url) = self.compositor.content_url() {
                    self.pending_titles.record(&url, &title);
                }
                Ok(())
            }
            ShellEvent::LauncherLoaded { url } => self.on_launcher_loaded(&url),
            ShellEvent::ResolverTitle { id, title } => {
                if let Some((reply_id, title)) = self.resolvers.on_title(id, &title) {
                    self.reply(reply_id, &Value::String(title));
                }
                Ok(())
            }
            ShellEvent::ResolverFinished { id } => {
                self.resolvers.on_finished(id, &self.proxy);
                Ok(())
            }
            ShellEvent::ResolverTimeout { id } => {
                if let Some((reply_id, title)) = self.resolvers.on_timeout(id) {
                    self.reply(reply_id, &Value::String(title));
                }
                Ok(())
            }
            ShellEvent::BackfillFinished { ok } => {
                if ok {
                    self.pending_titles.clear();
                } else {
                    // Left intact; retried on the next launcher load.
                    debug!("saved-link backfill script failed");
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("shell operation failed: {e:#}");
        }
    }

    fn handle_ipc(&mut self, window: &Window, msg: IpcMessage) -> Result<()> {
        match msg {
            IpcMessage::Open { url } | IpcMessage::OpenUrl { url } => {
                self.compositor.show_content(window, &url)
            }
            IpcMessage::Home | IpcMessage::GoHome => self.compositor.go_home(),
            IpcMessage::SetHeight { height } => {
                self.compositor.set_overlay_height(window, height)
            }
            IpcMessage::Devtools => {
                self.compositor.toggle_devtools();
                Ok(())
            }
            IpcMessage::ResolveTitle { id, url } => {
                if !router::is_allowed(&url) {
                    self.reply(id, &Value::String(String::new()));
                    return Ok(());
                }
                if let Err(e) = self.resolvers.begin(window, &self.proxy, id, &url) {
                    warn!("title resolver surface failed: {e:#}");
                    self.reply(id, &Value::String(String::new()));
                }
                Ok(())
            }
            IpcMessage::GetHotkeys { id } => {
                let value = serde_json::to_value(&self.hotkeys)?;
                self.reply(id, &value);
                Ok(())
            }
            IpcMessage::SaveHotkeys { id, hotkeys } => {
                // A non-object payload must not reset the map to defaults.
                match HotkeyMap::from_update(&hotkeys) {
                    Some(map) => {
                        self.hotkeys = map;
                        self.persist_hotkeys();
                        self.reply(id, &Value::Bool(true));
                    }
                    None => self.reply(id, &Value::Bool(false)),
                }
                Ok(())
            }
            IpcMessage::ResetHotkeys { id } => {
                self.hotkeys = HotkeyMap::default();
                self.persist_hotkeys();
                let value = serde_json::to_value(&self.hotkeys)?;
                self.reply(id, &value);
                Ok(())
            }
        }
    }

    fn handle_menu(&mut self, window: &Window, id: &str) -> Result<()> {
        match id {
            menu::OPEN_LINKS => self.compositor.go_home(),
            menu::SETTINGS => self.compositor.open_settings(),
            menu::RELOAD => {
                self.compositor.reload_active_surface();
                Ok(())
            }
            menu::FULLSCREEN => {
                let next = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(next);
                Ok(())
            }
            menu::DEVTOOLS => {
                self.compositor.toggle_devtools();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn go_home(&mut self) {
        if let Err(e) = self.compositor.go_home() {
            warn!("go home failed: {e:#}");
        }
    }

    /// Persist best-effort and refresh menu accelerators.
    fn persist_hotkeys(&mut self) {
        if let Err(e) = settings::save(&self.settings_path, &self.hotkeys) {
            warn!("failed to persist hotkeys: {e:#}");
        }
        self.menu.apply_hotkeys(&self.hotkeys);
    }

    fn on_launcher_loaded(&mut self, url: &str) -> Result<()> {
        if !pages::is_launcher_url(url) {
            return Ok(());
        }
        let Some(script) = self.pending_titles.injection_script() else {
            return Ok(());
        };
        let proxy = self.proxy.clone();
        self.compositor
            .launcher()
            .evaluate_script_with_callback(&script, move |result| {
                let ok = result.trim() == "true";
                let _ = proxy.send_event(ShellEvent::BackfillFinished { ok });
            })?;
        Ok(())
    }

    fn reply(&self, id: u64, value: &Value) {
        let script = resolve_script(id, value);
        if let Err(e) = self.compositor.launcher().evaluate_script(&script) {
            debug!("reply delivery failed: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_action_fullscreen_first() {
        let hotkeys = HotkeyMap::default();
        let input = KeyInput {
            key: "F11".to_string(),
            ..KeyInput::default()
        };
        assert_eq!(key_action(&hotkeys, &input), Some(KeyAction::ToggleFullscreen));
    }

    #[test]
    fn test_key_action_escape_returns_to_launcher() {
        let hotkeys = HotkeyMap::default();
        let input = KeyInput {
            key: "Escape".to_string(),
            ..KeyInput::default()
        };
        assert_eq!(key_action(&hotkeys, &input), Some(KeyAction::OpenMenu));
    }

    #[test]
    fn test_key_action_f12_fallback_for_devtools() {
        let hotkeys = HotkeyMap::default();
        let input = KeyInput {
            key: "F12".to_string(),
            ..KeyInput::default()
        };
        assert_eq!(key_action(&hotkeys, &input), Some(KeyAction::ToggleDevTools));
    }

    #[test]
    fn test_key_action_custom_devtools_chord() {
        let hotkeys = HotkeyMap::default();
        let input = KeyInput {
            key: "I".to_string(),
            shift: !cfg!(target_os = "macos"),
            alt: cfg!(target_os = "macos"),
            meta: cfg!(target_os = "macos"),
            control: !cfg!(target_os = "macos"),
        };
        assert_eq!(key_action(&hotkeys, &input), Some(KeyAction::ToggleDevTools));
    }

    #[test]
    fn test_key_action_unbound_key_passes_through() {
        let hotkeys = HotkeyMap::default();
        let input = KeyInput {
            key: "A".to_string(),
            ..KeyInput::default()
        };
        assert_eq!(key_action(&hotkeys, &input), None);
    }

    #[test]
    fn test_resolve_script_embeds_id_and_value() {
        let script = resolve_script(7, &Value::String("Example Domain".to_string()));
        assert!(script.contains("_resolve(7, \"Example Domain\")"));
        let script = resolve_script(2, &Value::Bool(true));
        assert!(script.contains("_resolve(2, true)"));
    }
}
