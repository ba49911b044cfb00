use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const BACKSPACE: &str = "BACKSPACE";
pub const SPACE: &str = "SPACE";
pub const NO_BEHAVIOR_PREFIX: &str = "NO BEHAVIOR";

/// Labels that are logged but never change the typed buffer.
const IGNORED_LABELS: &[&str] = &[
    "ENTER",
    "DELETE",
    "TAB",
    "ARROW_LEFT",
    "ARROW_RIGHT",
    "SHIFT",
    "CAPSLOCK",
    "\n",
    "\r",
    "\r\n",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "PascalCase")]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "PascalCase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FromStr for Hand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Hand::Left),
            "right" | "r" => Ok(Hand::Right),
            other => Err(format!("unknown hand `{other}`")),
        }
    }
}

impl FromStr for Finger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thumb" => Ok(Finger::Thumb),
            "index" => Ok(Finger::Index),
            "middle" => Ok(Finger::Middle),
            "ring" => Ok(Finger::Ring),
            "pinky" | "little" => Ok(Finger::Pinky),
            other => Err(format!("unknown finger `{other}`")),
        }
    }
}

/// Where a keystroke came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    /// The in-scene keyboard driven by the gloves.
    #[default]
    Virtual,
    /// A real keyboard, only honored in the no-VR modality.
    Physical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub label: String,
    pub hand: Option<Hand>,
    pub finger: Option<Finger>,
    pub source: InputSource,
}

impl KeyInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hand: None,
            finger: None,
            source: InputSource::Virtual,
        }
    }

    pub fn with_origin(mut self, hand: Option<Hand>, finger: Option<Finger>) -> Self {
        self.hand = hand;
        self.finger = finger;
        self
    }

    /// Maps a character typed on a physical keyboard to its key label.
    pub fn from_char(c: char) -> Self {
        let label = if c == ' ' {
            SPACE.to_string()
        } else if c == '\u{8}' {
            BACKSPACE.to_string()
        } else if c.is_control() {
            format!("{NO_BEHAVIOR_PREFIX}: {}", c.escape_default())
        } else {
            c.to_string()
        };
        Self {
            source: InputSource::Physical,
            ..Self::new(label)
        }
    }

    pub fn action(&self) -> KeyAction<'_> {
        KeyAction::classify(&self.label)
    }
}

/// What a key label does to the typed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction<'a> {
    Backspace,
    Space,
    Ignored,
    Insert(&'a str),
}

impl<'a> KeyAction<'a> {
    pub fn classify(label: &'a str) -> Self {
        if label == BACKSPACE {
            KeyAction::Backspace
        } else if label == SPACE {
            KeyAction::Space
        } else if label.is_empty()
            || label.starts_with(NO_BEHAVIOR_PREFIX)
            || IGNORED_LABELS.contains(&label)
        {
            KeyAction::Ignored
        } else {
            KeyAction::Insert(label)
        }
    }
}
