// ABOUTME: Accelerator-string matching for keyboard input events
// ABOUTME: Pure, total function: invalid accelerators never match and never panic

/// A normalized keyboard event as seen by the coordinator.
///
/// `key` is compared case-insensitively against the accelerator's base
/// token, so callers may pass whatever casing the platform reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyInput {
    pub key: String,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub control: bool,
}

/// Returns true iff `input` satisfies `accelerator`.
///
/// An accelerator is a `+`-joined list of modifier tokens (SHIFT, ALT,
/// COMMAND, CTRL/CONTROL, CMDORCTRL) followed by exactly one base key:
/// a function key `F1`-`F12`, `ESC`/`ESCAPE`, or a literal key token.
///
/// Every named modifier must be active, and every active modifier must be
/// accounted for. CMDORCTRL is satisfied by either meta or control, and
/// while it is named, either of those being active counts as accounted for.
pub fn matches(input: &KeyInput, accelerator: &str) -> bool {
    let accel = accelerator.trim().to_uppercase();
    if accel.is_empty() {
        return false;
    }

    let parts: Vec<&str> = accel.split('+').map(str::trim).collect();
    let Some((&base, mods)) = parts.split_last() else {
        return false;
    };
    if base.is_empty() {
        return false;
    }

    let wants = |token: &str| mods.contains(&token);
    let primary = wants("CMDORCTRL");

    // Named modifiers must be held.
    if wants("SHIFT") && !input.shift {
        return false;
    }
    if wants("ALT") && !input.alt {
        return false;
    }
    if wants("COMMAND") && !input.meta {
        return false;
    }
    if (wants("CTRL") || wants("CONTROL")) && !input.control {
        return false;
    }
    if primary && !(input.meta || input.control) {
        return false;
    }

    // Held modifiers must be named; CMDORCTRL accounts for both primaries.
    if input.shift && !wants("SHIFT") {
        return false;
    }
    if input.alt && !wants("ALT") {
        return false;
    }
    if input.meta && !(wants("COMMAND") || primary) {
        return false;
    }
    if input.control && !(wants("CTRL") || wants("CONTROL") || primary) {
        return false;
    }

    let key = input.key.to_uppercase();
    if is_function_key(base) || base == "ESC" || base == "ESCAPE" {
        let want = if base == "ESC" { "ESCAPE" } else { base };
        return key == want;
    }
    key == base
}

fn is_function_key(token: &str) -> bool {
    let Some(digits) = token.strip_prefix('F') else {
        return false;
    };
    !digits.is_empty() && digits.len() <= 2 && digits.chars().all(|c| c.is_ascii_digit())
}
