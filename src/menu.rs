// ABOUTME: Application menu bar built with muda; presentation-only surface
// ABOUTME: Accelerators track the hotkey map and refresh when settings change

use crate::settings::{Action, HotkeyMap};
use anyhow::Result;
use muda::accelerator::Accelerator;
use muda::{Menu, MenuItem, PredefinedMenuItem, Submenu};
use tao::window::Window;

pub const OPEN_LINKS: &str = "open-links";
pub const SETTINGS: &str = "settings";
pub const RELOAD: &str = "reload";
pub const FULLSCREEN: &str = "toggle-fullscreen";
pub const DEVTOOLS: &str = "toggle-devtools";

fn parse_accelerator(accel: &str) -> Option<Accelerator> {
    accel.parse().ok()
}

fn settings_accelerator() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+,"
    } else {
        "Ctrl+,"
    }
}

/// The menu bar and the items whose accelerators mirror the hotkey map.
pub struct AppMenu {
    menu: Menu,
    open_links: MenuItem,
    fullscreen: MenuItem,
    devtools: MenuItem,
}

impl AppMenu {
    pub fn build(hotkeys: &HotkeyMap) -> Result<Self> {
        let menu = Menu::new();

        let open_links = MenuItem::with_id(
            OPEN_LINKS,
            "Open Saved Links",
            true,
            parse_accelerator(hotkeys.get(Action::OpenMenu)),
        );
        let settings = MenuItem::with_id(
            SETTINGS,
            "Settings…",
            true,
            parse_accelerator(settings_accelerator()),
        );
        let app = Submenu::new("App", true);
        app.append_items(&[
            &open_links,
            &settings,
            &PredefinedMenuItem::separator(),
            &PredefinedMenuItem::quit(None),
        ])?;

        // Standard edit roles so clipboard shortcuts work inside webviews.
        let edit = Submenu::new("Edit", true);
        edit.append_items(&[
            &PredefinedMenuItem::undo(None),
            &PredefinedMenuItem::redo(None),
            &PredefinedMenuItem::separator(),
            &PredefinedMenuItem::cut(None),
            &PredefinedMenuItem::copy(None),
            &PredefinedMenuItem::paste(None),
            &PredefinedMenuItem::select_all(None),
        ])?;

        let reload = MenuItem::with_id(RELOAD, "Reload", true, parse_accelerator("CmdOrCtrl+R"));
        let fullscreen = MenuItem::with_id(
            FULLSCREEN,
            "Toggle Full Screen",
            true,
            parse_accelerator(hotkeys.get(Action::ToggleFullscreen)),
        );
        let devtools = MenuItem::with_id(
            DEVTOOLS,
            "Toggle Developer Tools",
            true,
            parse_accelerator(hotkeys.get(Action::ToggleDevTools)),
        );
        let view = Submenu::new("View", true);
        view.append_items(&[
            &reload,
            &PredefinedMenuItem::separator(),
            &fullscreen,
            &devtools,
        ])?;

        menu.append_items(&[&app, &edit, &view])?;

        Ok(AppMenu {
            menu,
            open_links,
            fullscreen,
            devtools,
        })
    }

    /// Attach the menu bar to the platform shell.
    pub fn install(&self, window: &Window) -> Result<()> {
        #[cfg(target_os = "macos")]
        {
            let _ = window;
            self.menu.init_for_nsapp();
        }
        #[cfg(target_os = "windows")]
        {
            use tao::platform::windows::WindowExtWindows;
            unsafe { self.menu.init_for_hwnd(window.hwnd() as isize)? };
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            use tao::platform::unix::WindowExtUnix;
            self.menu
                .init_for_gtk_window(window.gtk_window(), window.default_vbox())?;
        }
        Ok(())
    }

    /// Refresh the customizable accelerators after the hotkey map changed.
    pub fn apply_hotkeys(&self, hotkeys: &HotkeyMap) {
        let _ = self
            .open_links
            .set_accelerator(parse_accelerator(hotkeys.get(Action::OpenMenu)));
        let _ = self
            .fullscreen
            .set_accelerator(parse_accelerator(hotkeys.get(Action::ToggleFullscreen)));
        let _ = self
            .devtools
            .set_accelerator(parse_accelerator(hotkeys.get(Action::ToggleDevTools)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hotkeys_parse_as_accelerators() {
        let hotkeys = HotkeyMap::default();
        assert!(parse_accelerator(hotkeys.get(Action::OpenMenu)).is_some());
        assert!(parse_accelerator(hotkeys.get(Action::ToggleFullscreen)).is_some());
        assert!(parse_accelerator(hotkeys.get(Action::ToggleDevTools)).is_some());
    }

    #[test]
    fn test_garbage_accelerators_parse_to_none() {
        assert!(parse_accelerator("").is_none());
        assert!(parse_accelerator("NotAModifier+Q+Q").is_none());
    }
}
