//! Operator input surface: keys and the actions they trigger.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A key signal from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Backspace, typed as DEL or BS.
    Backspace,
    /// Forward delete.
    Delete,
    /// A printable key, stored lowercase.
    Char(char),
}

impl FromStr for Key {
    type Err = Error;

    /// Parse a typed token.
    ///
    /// Accepts key names (`left`, `ArrowRight`, `backspace`), the escape
    /// sequences a terminal sends for the arrow keys, and single characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\u{1b}[D" | "\u{1b}OD" => return Ok(Self::Left),
            "\u{1b}[C" | "\u{1b}OC" => return Ok(Self::Right),
            "\u{7f}" | "\u{8}" => return Ok(Self::Backspace),
            "\u{1b}[3~" => return Ok(Self::Delete),
            _ => {}
        }

        let token = s.trim();
        match token.to_ascii_lowercase().as_str() {
            "left" | "arrowleft" | "<" => Ok(Self::Left),
            "right" | "arrowright" | ">" => Ok(Self::Right),
            "backspace" | "bs" => Ok(Self::Backspace),
            "delete" | "del" => Ok(Self::Delete),
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char(c.to_ascii_lowercase())),
                    _ => Err(Error::UnknownKey(s.to_string())),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("←"),
            Self::Right => f.write_str("→"),
            Self::Backspace => f.write_str("⌫"),
            Self::Delete => f.write_str("Del"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Dislike the current item.
    Reject,
    /// Like the current item.
    Accept,
    /// Reverse the most recent decision.
    Undo,
    /// Write the current report and logs.
    Export,
    /// Print the activity log.
    ShowLog,
    /// Print the liked list.
    ShowLiked,
    /// Print key bindings.
    Help,
    /// End the session.
    Quit,
}

impl Action {
    /// Whether the action changes review state.
    #[must_use]
    pub fn is_review(self) -> bool {
        matches!(self, Self::Reject | Self::Accept | Self::Undo)
    }
}

/// Key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: HashMap<Key, Action>,
}

impl Default for KeyMap {
    /// Arrow keys classify, Backspace/Delete undo, letters for the rest.
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Key::Left, Action::Reject)
            .bind(Key::Right, Action::Accept)
            .bind(Key::Backspace, Action::Undo)
            .bind(Key::Delete, Action::Undo)
            .bind(Key::Char('n'), Action::Reject)
            .bind(Key::Char('y'), Action::Accept)
            .bind(Key::Char('u'), Action::Undo)
            .bind(Key::Char('s'), Action::Export)
            .bind(Key::Char('l'), Action::ShowLog)
            .bind(Key::Char('k'), Action::ShowLiked)
            .bind(Key::Char('?'), Action::Help)
            .bind(Key::Char('h'), Action::Help)
            .bind(Key::Char('q'), Action::Quit);
        map
    }
}

impl KeyMap {
    /// A map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key, replacing any previous binding for it.
    pub fn bind(&mut self, key: Key, action: Action) -> &mut Self {
        self.bindings.insert(key, action);
        self
    }

    /// Action bound to a key.
    #[must_use]
    pub fn action(&self, key: Key) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Parse a token and look up its action.
    pub fn action_for_token(&self, token: &str) -> Result<Option<Action>, Error> {
        let key: Key = token.parse()?;
        Ok(self.action(key))
    }

    /// Keys bound to an action, sorted for stable display.
    #[must_use]
    pub fn keys_for(&self, action: Action) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_escapes() {
        assert_eq!("ArrowLeft".parse::<Key>().unwrap(), Key::Left);
        assert_eq!("right".parse::<Key>().unwrap(), Key::Right);
        assert_eq!("\u{1b}[D".parse::<Key>().unwrap(), Key::Left);
        assert_eq!("\u{1b}[C".parse::<Key>().unwrap(), Key::Right);
        assert_eq!("\u{1b}[3~".parse::<Key>().unwrap(), Key::Delete);
        assert_eq!("Y".parse::<Key>().unwrap(), Key::Char('y'));
        assert!(matches!("jump".parse::<Key>(), Err(Error::UnknownKey(_))));
    }

    #[test]
    fn test_default_bindings() {
        let map = KeyMap::default();
        assert_eq!(map.action(Key::Left), Some(Action::Reject));
        assert_eq!(map.action(Key::Right), Some(Action::Accept));
        assert_eq!(map.action(Key::Backspace), Some(Action::Undo));
        assert_eq!(map.action(Key::Delete), Some(Action::Undo));
        assert_eq!(map.action(Key::Char('z')), None);
    }

    #[test]
    fn test_action_for_token() {
        let map = KeyMap::default();
        assert_eq!(map.action_for_token("q").unwrap(), Some(Action::Quit));
        assert_eq!(map.action_for_token("x").unwrap(), None);
        assert!(map.action_for_token("nonsense").is_err());
    }

    #[test]
    fn test_review_actions() {
        assert!(Action::Undo.is_review());
        assert!(!Action::Export.is_review());
    }
}
