// ABOUTME: Command Surface wire messages posted by the shell documents
// ABOUTME: Tagged JSON over window.ipc.postMessage; replies go back via window.__beacon._resolve

use serde::Deserialize;
use serde_json::Value;

/// Everything the toolbar, launcher, and settings documents may ask of the
/// shell. Request/response messages carry a caller-chosen `id` echoed back
/// with the reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IpcMessage {
    // Toolbar surface.
    Open { url: String },
    Home,
    SetHeight { height: f64 },
    Devtools,
    // Launcher and settings documents.
    #[serde(rename = "openURL")]
    OpenUrl { url: String },
    GoHome,
    ResolveTitle { id: u64, url: String },
    GetHotkeys { id: u64 },
    SaveHotkeys { id: u64, hotkeys: Value },
    ResetHotkeys { id: u64 },
}

/// Parse a posted message body. Malformed messages are dropped by the
/// caller, matching the shell's silent-degradation policy.
pub fn parse(body: &str) -> Option<IpcMessage> {
    serde_json::from_str(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toolbar_messages() {
        assert_eq!(
            parse(r#"{"type":"open","url":"https://example.com"}"#),
            Some(IpcMessage::Open {
                url: "https://example.com".to_string()
            })
        );
        assert_eq!(parse(r#"{"type":"home"}"#), Some(IpcMessage::Home));
        assert_eq!(
            parse(r#"{"type":"setHeight","height":320}"#),
            Some(IpcMessage::SetHeight { height: 320.0 })
        );
        assert_eq!(parse(r#"{"type":"devtools"}"#), Some(IpcMessage::Devtools));
    }

    #[test]
    fn test_parse_launcher_messages() {
        assert_eq!(
            parse(r#"{"type":"openURL","url":"https://example.com"}"#),
            Some(IpcMessage::OpenUrl {
                url: "https://example.com".to_string()
            })
        );
        assert_eq!(parse(r#"{"type":"goHome"}"#), Some(IpcMessage::GoHome));
        assert_eq!(
            parse(r#"{"type":"resolveTitle","id":3,"url":"https://x.com"}"#),
            Some(IpcMessage::ResolveTitle {
                id: 3,
                url: "https://x.com".to_string()
            })
        );
    }

    #[test]
    fn test_parse_hotkey_messages() {
        assert_eq!(
            parse(r#"{"type":"getHotkeys","id":1}"#),
            Some(IpcMessage::GetHotkeys { id: 1 })
        );
        let msg = parse(r#"{"type":"saveHotkeys","id":2,"hotkeys":{"openURL":"CmdOrCtrl+L"}}"#);
        match msg {
            Some(IpcMessage::SaveHotkeys { id, hotkeys }) => {
                assert_eq!(id, 2);
                assert_eq!(hotkeys["openURL"], "CmdOrCtrl+L");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            parse(r#"{"type":"resetHotkeys","id":4}"#),
            Some(IpcMessage::ResetHotkeys { id: 4 })
        );
    }

    #[test]
    fn test_malformed_messages_are_dropped() {
        assert_eq!(parse("not json"), None);
        assert_eq!(parse(r#"{"type":"unknown"}"#), None);
        assert_eq!(parse(r#"{"type":"open"}"#), None);
    }
}
