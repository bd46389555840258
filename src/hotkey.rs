use crate::command::{Command, Rgb, LARGE_BRUSH, SMALL_BRUSH};
use crate::error::DuplicateBindingError;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub win: bool,
}

impl Modifiers {
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
        win: false,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        alt: false,
        win: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Uppercase ASCII letter.
    Letter(char),
    /// Top-row digit 0-9.
    Digit(u8),
    /// Function key F1-F24.
    Function(u8),
}

impl Key {
    /// Win32 virtual-key code.
    pub fn virtual_key(self) -> Option<u32> {
        match self {
            Key::Letter(c) if c.is_ascii_uppercase() => Some(c as u32),
            Key::Digit(d) if d <= 9 => Some(0x30 + d as u32),
            Key::Function(n) if (1..=24).contains(&n) => Some(0x6F + n as u32),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::Function(n) => write!(f, "F{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyCombo {
    pub const fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.win {
            write!(f, "Win+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parse a hotkey string like "Ctrl+Shift+D" into a [`KeyCombo`].
pub fn parse_hotkey(s: &str) -> Option<KeyCombo> {
    let mut modifiers = Modifiers::default();
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => modifiers.ctrl = true,
            "SHIFT" => modifiers.shift = true,
            "ALT" => modifiers.alt = true,
            "WIN" | "SUPER" => modifiers.win = true,
            "" => {}
            other => {
                if key.is_some() {
                    return None;
                }
                key = Some(parse_key(other)?);
            }
        }
    }

    key.map(|key| KeyCombo { modifiers, key })
}

fn parse_key(upper: &str) -> Option<Key> {
    let mut chars = upper.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(Key::Letter(c)),
        (Some(c), None) if c.is_ascii_digit() => Some(Key::Digit(c as u8 - b'0')),
        (Some('F'), Some(_)) => match upper[1..].parse::<u8>().ok() {
            Some(n) if (1..=24).contains(&n) => Some(Key::Function(n)),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub command: Command,
    pub combo: KeyCombo,
    pub description: String,
}

impl HotkeyBinding {
    pub fn new(combo: KeyCombo, command: Command) -> Self {
        Self {
            command,
            combo,
            description: command.describe(),
        }
    }
}

/// Registration handle used with the OS hotkey API. Stable per table position.
pub type HotkeyId = i32;

/// Ordered, duplicate-free set of bindings. Iteration order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyTable {
    bindings: Vec<HotkeyBinding>,
}

impl HotkeyTable {
    pub fn new(
        bindings: impl IntoIterator<Item = HotkeyBinding>,
    ) -> Result<Self, DuplicateBindingError> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for binding in bindings {
            if !seen.insert(binding.combo) {
                return Err(DuplicateBindingError {
                    combo: binding.combo,
                });
            }
            collected.push(binding);
        }
        Ok(Self {
            bindings: collected,
        })
    }

    /// The built-in table. Not remappable.
    pub fn fixed() -> Self {
        let letter = |c| KeyCombo::new(Modifiers::CTRL_SHIFT, Key::Letter(c));
        let digit = |d| KeyCombo::new(Modifiers::CTRL_SHIFT, Key::Digit(d));
        Self {
            bindings: vec![
                HotkeyBinding::new(letter('D'), Command::ToggleOverlay),
                HotkeyBinding::new(letter('C'), Command::ClearCanvas),
                HotkeyBinding::new(letter('R'), Command::SetColor(Rgb::RED)),
                HotkeyBinding::new(letter('B'), Command::SetColor(Rgb::BLUE)),
                HotkeyBinding::new(letter('W'), Command::SetColor(Rgb::WHITE)),
                HotkeyBinding::new(letter('G'), Command::SetColor(Rgb::GREEN)),
                HotkeyBinding::new(digit(1), Command::SetBrushSize(SMALL_BRUSH)),
                HotkeyBinding::new(digit(2), Command::SetBrushSize(LARGE_BRUSH)),
                HotkeyBinding::new(letter('T'), Command::ToggleClickThrough),
                HotkeyBinding::new(
                    KeyCombo::new(Modifiers::CTRL, Key::Letter('Z')),
                    Command::Undo,
                ),
                HotkeyBinding::new(
                    KeyCombo::new(Modifiers::CTRL, Key::Letter('Y')),
                    Command::Redo,
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HotkeyId, &HotkeyBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(idx, binding)| (idx as HotkeyId + 1, binding))
    }

    pub fn get(&self, id: HotkeyId) -> Option<&HotkeyBinding> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.bindings.get(idx)
    }

    pub fn id_for(&self, combo: KeyCombo) -> Option<HotkeyId> {
        self.iter()
            .find(|(_, binding)| binding.combo == combo)
            .map(|(id, _)| id)
    }

    /// One line per binding, for the tray's hotkey list.
    pub fn describe(&self) -> String {
        self.bindings
            .iter()
            .map(|binding| format!("{}  {}", binding.combo, binding.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for HotkeyTable {
    fn default() -> Self {
        Self::fixed()
    }
}
