//! Key notation normalization.
//!
//! Users spell the same key many ways (`<ctrl+x>`, `<C-x>`, `<c-x>`, `ctrl+x`).
//! Configuration entries and tokenized input are folded into one bracketed
//! form here so chord equality can stay a plain string comparison.
//!
//! Rules, applied in order:
//! 1. Single-character tokens pass through unchanged.
//! 2. Everything else is wrapped in `<...>` when not already bracketed.
//! 3. `<leader>` resolves to the configured leader chord.
//! 4. Arrow keys are returned lower-cased and bracketed.
//! 5. The synonym table below collapses aliases (case-insensitive).
//! 6. When nothing changed besides case, the user's spelling is kept.

use tracing::trace;

/// Synonym table applied to the lower-cased, bracketed token. Order matters:
/// modifier prefixes are rewritten before whole-key names.
const NOTATION_MAP: &[(&[&str], &str)] = &[
    (&["<ctrl+", "<c-"], "<C-"),
    (&["<cmd+", "<d-"], "<D-"),
    (&["<escape>", "<esc>"], "<Esc>"),
    (&["<backspace>", "<bs>"], "<BS>"),
    (&["<delete>", "<del>"], "<Del>"),
    (&["<home>"], "<Home>"),
    (&["<end>"], "<End>"),
    (&["<insert>"], "<Insert>"),
    (&["<space>"], " "),
    (&["<cr>", "<enter>"], "\n"),
];

const ARROW_KEYS: &[&str] = &["<up>", "<down>", "<left>", "<right>"];

fn is_surrounded_by_angle_brackets(key: &str) -> bool {
    key.starts_with('<') && key.ends_with('>')
}

/// Normalize a raw key token into canonical chord text.
pub fn normalize_key(key: &str, leader: &str) -> String {
    if key.chars().count() == 1 {
        return key.to_string();
    }

    let mut original = key.to_string();
    let mut lowered = key.to_lowercase();
    if !is_surrounded_by_angle_brackets(&lowered) {
        lowered = format!("<{lowered}>");
        original = format!("<{original}>");
    }

    if lowered == "<leader>" {
        trace!(target: "input.notation", leader, "leader_resolved");
        return leader.to_string();
    }

    if ARROW_KEYS.contains(&lowered.as_str()) {
        return lowered;
    }

    let mut normalized = lowered;
    for (aliases, standard) in NOTATION_MAP {
        for alias in *aliases {
            if normalized.contains(alias) {
                normalized = normalized.replace(alias, standard);
            }
        }
    }

    if original.to_lowercase() == normalized {
        original
    } else {
        trace!(target: "input.notation", raw = key, normalized = normalized.as_str(), "key_normalized");
        normalized
    }
}

/// Convert `<tab>` into a literal tab for direct-insertion contexts.
pub fn to_control_character(key: &str) -> &str {
    if key == "<tab>" { "\t" } else { key }
}

/// Bracketed special keys, except the few that behave like plain text input.
pub fn is_control_key(key: &str) -> bool {
    let upper = key.to_uppercase();
    is_surrounded_by_angle_brackets(&upper)
        && upper.len() > 1
        && upper != "<BS>"
        && upper != "<SHIFT+BS>"
        && upper != "<TAB>"
}

/// Normalized form suitable for logs and traces (`" "` shows as `<space>`).
pub fn printable_key(key: &str, leader: &str) -> String {
    let normalized = normalize_key(key, leader);
    match normalized.as_str() {
        " " => "<space>".to_string(),
        "\n" => "<enter>".to_string(),
        _ => normalized,
    }
}
