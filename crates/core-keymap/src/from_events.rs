//! Conversion from host key tokens into canonical chords.

use core_events::{KeyToken, ModMask, NamedKey};

use crate::Chord;

fn named_text(key: NamedKey) -> String {
    match key {
        NamedKey::Enter => "CR".into(),
        NamedKey::Esc => "Esc".into(),
        NamedKey::Backspace => "BS".into(),
        NamedKey::Tab => "tab".into(),
        NamedKey::F(n) => format!("F{n}"),
        NamedKey::Up => "up".into(),
        NamedKey::Down => "down".into(),
        NamedKey::Left => "left".into(),
        NamedKey::Right => "right".into(),
        NamedKey::Home => "Home".into(),
        NamedKey::End => "End".into(),
        NamedKey::PageUp => "PageUp".into(),
        NamedKey::PageDown => "PageDown".into(),
        NamedKey::Insert => "Insert".into(),
        NamedKey::Delete => "Del".into(),
    }
}

fn base_text(token: &KeyToken) -> String {
    match token {
        KeyToken::Char(c) => c.to_string(),
        KeyToken::Named(n) => named_text(*n),
        // Nested chords do not occur from real hosts; flatten to the innermost base.
        KeyToken::Chord { base, .. } => base_text(base),
    }
}

const MOD_PREFIXES: &[(ModMask, &str)] = &[
    (ModMask::CTRL, "C-"),
    (ModMask::ALT, "A-"),
    (ModMask::SHIFT, "S-"),
    (ModMask::META, "M-"),
    (ModMask::SUPER, "D-"),
];

impl From<&KeyToken> for Chord {
    fn from(token: &KeyToken) -> Self {
        match token {
            KeyToken::Char(c) => Chord::from(*c),
            KeyToken::Named(NamedKey::Enter) => Chord::from('\n'),
            KeyToken::Named(n) => Chord::new(format!("<{}>", named_text(*n))),
            // Shifted printable characters already arrive in their shifted form.
            KeyToken::Chord { base, mods }
                if *mods == ModMask::SHIFT && matches!(**base, KeyToken::Char(_)) =>
            {
                Chord::from(&**base)
            }
            KeyToken::Chord { base, mods } => {
                let mut text = String::from("<");
                for (flag, prefix) in MOD_PREFIXES {
                    if mods.contains(*flag) {
                        text.push_str(prefix);
                    }
                }
                text.push_str(&base_text(base));
                text.push('>');
                Chord::new(text)
            }
        }
    }
}
