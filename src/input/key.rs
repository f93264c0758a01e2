//! Key tokens and key sequences.
//!
//! A key token is the smallest unit the binding registry understands: either a
//! printable character (`a`, `G`, `/`) or a named special key written in angle
//! brackets (`<Enter>`, `<C-w>`, `<M-x>`, `<S-Tab>`, `<F1>`). Tokens are kept
//! in a canonical textual form so that `"<c-W>"` typed in a config file and a
//! Ctrl+W key press from the terminal compare equal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;

/// Named keys accepted inside `<...>`, with their canonical spelling.
const NAMED_KEYS: &[(&str, &str)] = &[
    ("enter", "Enter"),
    ("cr", "Enter"),
    ("return", "Enter"),
    ("tab", "Tab"),
    ("esc", "Esc"),
    ("escape", "Esc"),
    ("backspace", "Backspace"),
    ("bs", "Backspace"),
    ("delete", "Delete"),
    ("del", "Delete"),
    ("insert", "Insert"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
    ("up", "Up"),
    ("down", "Down"),
    ("left", "Left"),
    ("right", "Right"),
];

/// A single key press in canonical textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyToken(String);

impl KeyToken {
    /// A token for a printable character.
    pub fn char(c: char) -> Self {
        KeyToken(c.to_string())
    }

    /// Parse the inside of a `<...>` group. Returns `None` if the name is not
    /// a recognised key, in which case the caller treats the group literally.
    pub fn named(inner: &str) -> Option<Self> {
        Self::canonical_name(inner).map(KeyToken)
    }

    fn canonical_name(inner: &str) -> Option<String> {
        if inner.eq_ignore_ascii_case("lt") {
            return Some("<".to_string());
        }
        if inner.eq_ignore_ascii_case("space") {
            return Some(" ".to_string());
        }

        if let Some((modifier, rest)) = split_modifier(inner) {
            let base = match single_char(rest) {
                Some(c) if modifier == 'C' => c.to_ascii_lowercase().to_string(),
                Some(c) => c.to_string(),
                None if rest.eq_ignore_ascii_case("space") => "Space".to_string(),
                None => base_name(rest)?.to_string(),
            };
            return Some(format!("<{modifier}-{base}>"));
        }

        if let Some(n) = function_key(inner) {
            return Some(format!("<F{n}>"));
        }

        base_name(inner).map(|name| format!("<{name}>"))
    }

    /// Translate a terminal key event into a token.
    ///
    /// Returns `None` for keys the dashboard has no textual name for
    /// (media keys, lone modifiers, ...).
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        let base = match event.code {
            KeyCode::Char(' ') if ctrl || alt => "Space".to_string(),
            KeyCode::Char(c) => {
                if ctrl {
                    c.to_ascii_lowercase().to_string()
                } else if alt {
                    c.to_string()
                } else {
                    return Some(KeyToken::char(c));
                }
            }
            // Many terminals report Ctrl+Space as NUL
            KeyCode::Null => return Some(KeyToken("<C-Space>".to_string())),
            KeyCode::BackTab => return Some(KeyToken("<S-Tab>".to_string())),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            _ => return None,
        };

        let token = if ctrl {
            format!("<C-{base}>")
        } else if alt {
            format!("<M-{base}>")
        } else {
            format!("<{base}>")
        };
        Some(KeyToken(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The character this token inserts when typed into a prompt, if any.
    pub fn printable(&self) -> Option<char> {
        single_char(&self.0)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A literal '<' is written back in its escaped form so that the
        // output can be tokenized again.
        if self.0 == "<" {
            f.write_str("<lt>")
        } else {
            f.write_str(&self.0)
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn split_modifier(inner: &str) -> Option<(char, &str)> {
    let mut chars = inner.chars();
    let modifier = chars.next()?.to_ascii_uppercase();
    if !matches!(modifier, 'C' | 'M' | 'A' | 'S') || chars.next()? != '-' {
        return None;
    }
    let rest = &inner[2..];
    if rest.is_empty() {
        return None;
    }
    // <A-x> is an alias of <M-x>
    let modifier = if modifier == 'A' { 'M' } else { modifier };
    // <S-x> only makes sense for named keys; printable shifted keys are
    // already upper case characters.
    if modifier == 'S' && single_char(rest).is_some() {
        return None;
    }
    Some((modifier, rest))
}

fn base_name(name: &str) -> Option<&'static str> {
    if let Some(n) = function_key(name) {
        // Modifier combinations such as <C-F5>
        const F_KEYS: [&str; 12] = [
            "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
        ];
        return F_KEYS.get(n as usize - 1).copied();
    }
    NAMED_KEYS
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
}

fn function_key(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('F').or_else(|| name.strip_prefix('f'))?;
    let n: u8 = digits.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

/// An ordered list of key tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyToken>);

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize a textual key sequence such as `"gg"` or `"<C-w>o"`.
    ///
    /// A `<` that does not start a recognised key name is taken literally, so
    /// `"<foo>"` is the five characters `<`, `f`, `o`, `o`, `>`.
    pub fn parse(input: &str) -> Self {
        let mut tokens = Vec::new();
        let mut rest = input;

        while let Some(c) = rest.chars().next() {
            if c == '<' {
                if let Some(end) = rest.find('>') {
                    if let Some(token) = KeyToken::named(&rest[1..end]) {
                        tokens.push(token);
                        rest = &rest[end + 1..];
                        continue;
                    }
                }
            }
            tokens.push(KeyToken::char(c));
            rest = &rest[c.len_utf8()..];
        }

        KeySequence(tokens)
    }

    pub fn push(&mut self, token: KeyToken) {
        self.0.push(token);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn tokens(&self) -> &[KeyToken] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyToken> {
        self.0.iter()
    }

    pub fn into_tokens(self) -> Vec<KeyToken> {
        self.0
    }
}

impl From<Vec<KeyToken>> for KeySequence {
    fn from(tokens: Vec<KeyToken>) -> Self {
        KeySequence(tokens)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
