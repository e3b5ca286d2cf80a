// ABOUTME: Persisted hotkey settings: JSON file in the per-user config directory
// ABOUTME: Reads merge over built-in defaults; writes are best-effort and never fatal

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed set of user-remappable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenUrl,
    SaveLink,
    CancelModal,
    OpenMenu,
    ToggleDevTools,
    ToggleFullscreen,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::OpenUrl,
        Action::SaveLink,
        Action::CancelModal,
        Action::OpenMenu,
        Action::ToggleDevTools,
        Action::ToggleFullscreen,
    ];

    /// The settings-file and IPC key for this action.
    pub fn key(self) -> &'static str {
        match self {
            Action::OpenUrl => "openURL",
            Action::SaveLink => "saveLink",
            Action::CancelModal => "cancelModal",
            Action::OpenMenu => "openMenu",
            Action::ToggleDevTools => "toggleDevTools",
            Action::ToggleFullscreen => "toggleFullscreen",
        }
    }
}

/// Accelerator string per action. Every action always has a value;
/// missing or malformed persisted entries fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotkeyMap {
    #[serde(rename = "openURL")]
    pub open_url: String,
    #[serde(rename = "saveLink")]
    pub save_link: String,
    #[serde(rename = "cancelModal")]
    pub cancel_modal: String,
    #[serde(rename = "openMenu")]
    pub open_menu: String,
    #[serde(rename = "toggleDevTools")]
    pub toggle_dev_tools: String,
    #[serde(rename = "toggleFullscreen")]
    pub toggle_fullscreen: String,
}

impl Default for HotkeyMap {
    fn default() -> Self {
        let dev_tools = if cfg!(target_os = "macos") {
            "Alt+Command+I"
        } else {
            "Ctrl+Shift+I"
        };
        HotkeyMap {
            open_url: "CmdOrCtrl+O".to_string(),
            save_link: "CmdOrCtrl+S".to_string(),
            cancel_modal: "Escape".to_string(),
            open_menu: "Escape".to_string(),
            toggle_dev_tools: dev_tools.to_string(),
            toggle_fullscreen: "F11".to_string(),
        }
    }
}

impl HotkeyMap {
    pub fn get(&self, action: Action) -> &str {
        match action {
            Action::OpenUrl => &self.open_url,
            Action::SaveLink => &self.save_link,
            Action::CancelModal => &self.cancel_modal,
            Action::OpenMenu => &self.open_menu,
            Action::ToggleDevTools => &self.toggle_dev_tools,
            Action::ToggleFullscreen => &self.toggle_fullscreen,
        }
    }

    fn set(&mut self, action: Action, accelerator: String) {
        let slot = match action {
            Action::OpenUrl => &mut self.open_url,
            Action::SaveLink => &mut self.save_link,
            Action::CancelModal => &mut self.cancel_modal,
            Action::OpenMenu => &mut self.open_menu,
            Action::ToggleDevTools => &mut self.toggle_dev_tools,
            Action::ToggleFullscreen => &mut self.toggle_fullscreen,
        };
        *slot = accelerator;
    }

    /// Defaults overlaid by the well-formed entries of a `{<action>: <accel>}`
    /// JSON object. Unknown keys and non-string values are ignored.
    pub fn merged_over_defaults(entries: &Value) -> Self {
        let mut map = HotkeyMap::default();
        if let Some(obj) = entries.as_object() {
            for action in Action::ALL {
                if let Some(accel) = obj.get(action.key()).and_then(Value::as_str) {
                    let accel = accel.trim();
                    if !accel.is_empty() {
                        map.set(action, accel.to_string());
                    }
                }
            }
        }
        map
    }

    /// `merged_over_defaults` for a client-supplied update. A payload that
    /// is not a JSON object is rejected outright so a malformed save
    /// request cannot silently reset every hotkey.
    pub fn from_update(entries: &Value) -> Option<Self> {
        entries.as_object()?;
        Some(HotkeyMap::merged_over_defaults(entries))
    }
}

/// Fixed per-user settings location: `<config_dir>/beacon/hotkeys.json`.
pub fn default_settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(config_dir.join("beacon").join("hotkeys.json"))
}

/// Load the hotkey map. Any read or parse failure, or an unexpected
/// document shape, yields the built-in defaults unchanged.
pub fn load(path: &Path) -> HotkeyMap {
    let Ok(content) = fs::read_to_string(path) else {
        return HotkeyMap::default();
    };
    let Ok(doc) = serde_json::from_str::<Value>(&content) else {
        return HotkeyMap::default();
    };
    HotkeyMap::merged_over_defaults(doc.get("hotkeys").unwrap_or(&Value::Null))
}

/// Persist the full map as `{"hotkeys": {...}}`, creating parent
/// directories as needed. Callers treat failure as non-fatal.
pub fn save(path: &Path, map: &HotkeyMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
    }
    let doc = serde_json::json!({ "hotkeys": map });
    let content = serde_json::to_string_pretty(&doc).context("Failed to serialize hotkeys")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        assert_eq!(load(&path), HotkeyMap::default());
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(load(&path), HotkeyMap::default());
    }

    #[test]
    fn test_load_wrong_shape_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        fs::write(&path, r#"{"hotkeys": [1, 2, 3]}"#).unwrap();
        assert_eq!(load(&path), HotkeyMap::default());
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        fs::write(&path, r#"{"hotkeys": {"openURL": "CmdOrCtrl+L"}}"#).unwrap();

        let map = load(&path);
        assert_eq!(map.open_url, "CmdOrCtrl+L");
        assert_eq!(map.toggle_fullscreen, HotkeyMap::default().toggle_fullscreen);
    }

    #[test]
    fn test_non_string_entries_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        fs::write(
            &path,
            r#"{"hotkeys": {"openURL": 5, "saveLink": "CmdOrCtrl+K", "bogus": "X"}}"#,
        )
        .unwrap();

        let map = load(&path);
        assert_eq!(map.open_url, HotkeyMap::default().open_url);
        assert_eq!(map.save_link, "CmdOrCtrl+K");
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("hotkeys.json");

        let mut map = HotkeyMap::default();
        map.open_url = "CmdOrCtrl+L".to_string();
        map.toggle_fullscreen = "F10".to_string();
        save(&path, &map).unwrap();

        assert_eq!(load(&path), map);
    }

    #[test]
    fn test_save_writes_wrapped_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotkeys.json");
        save(&path, &HotkeyMap::default()).unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc.get("hotkeys").and_then(Value::as_object).is_some());
        assert_eq!(
            doc["hotkeys"]["cancelModal"],
            Value::String("Escape".to_string())
        );
    }

    #[test]
    fn test_update_rejects_non_object_payloads() {
        assert_eq!(HotkeyMap::from_update(&Value::Null), None);
        assert_eq!(HotkeyMap::from_update(&serde_json::json!([1, 2])), None);
        assert_eq!(HotkeyMap::from_update(&serde_json::json!("CmdOrCtrl+O")), None);
    }

    #[test]
    fn test_update_accepts_object_payloads() {
        let map = HotkeyMap::from_update(&serde_json::json!({"openURL": "CmdOrCtrl+L"})).unwrap();
        assert_eq!(map.open_url, "CmdOrCtrl+L");
        assert_eq!(map.save_link, HotkeyMap::default().save_link);
        assert_eq!(
            HotkeyMap::from_update(&serde_json::json!({})),
            Some(HotkeyMap::default())
        );
    }

    #[test]
    fn test_merge_ignores_empty_strings() {
        let entries = serde_json::json!({ "openMenu": "   " });
        let map = HotkeyMap::merged_over_defaults(&entries);
        assert_eq!(map.open_menu, "Escape");
    }

    #[test]
    fn test_action_keys_are_stable() {
        let keys: Vec<&str> = Action::ALL.iter().map(|a| a.key()).collect();
        assert_eq!(
            keys,
            vec![
                "openURL",
                "saveLink",
                "cancelModal",
                "openMenu",
                "toggleDevTools",
                "toggleFullscreen"
            ]
        );
    }
}
