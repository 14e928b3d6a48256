//! Key bindings with attached help text.
//!
//! A [`Binding`] pairs one or more key presses with the short label and
//! description the help view prints. Components expose their bindings
//! through the [`KeyMap`] trait.
//!
//! ```rust
//! use pokemonster::key::{self, Binding};
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let next = Binding::new(vec![KeyCode::Right, KeyCode::Char('l')]).with_help("→/l", "next page");
//! let quit = key::new_binding(vec![key::with_keys_str(&["ctrl+c"])]).with_help("ctrl+c", "quit");
//!
//! let msg = KeyMsg { key: KeyCode::Char('l'), modifiers: KeyModifiers::NONE };
//! assert!(next.matches(&msg));
//! assert!(!quit.matches(&msg));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus required modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key.
    pub code: KeyCode,
    /// Modifiers that must be held. `NONE` accepts plain and shifted presses.
    pub modifiers: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl KeyPress {
    /// Parses names like `"ctrl+c"`, `"pgdown"`, `"left"` or `"G"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = s;
        loop {
            if let Some(r) = rest.strip_prefix("ctrl+") {
                modifiers |= KeyModifiers::CONTROL;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("alt+") {
                modifiers |= KeyModifiers::ALT;
                rest = r;
            } else {
                break;
            }
        }
        let code = match rest {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "pgup" => KeyCode::PageUp,
            "pgdown" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "enter" => KeyCode::Enter,
            "esc" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            " " | "space" => KeyCode::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(Self { code, modifiers })
    }

    fn matches(&self, msg: &KeyMsg) -> bool {
        if self.code != msg.key {
            return false;
        }
        if self.modifiers.is_empty() {
            !msg
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        } else {
            msg.modifiers.contains(self.modifiers)
        }
    }
}

/// Help text for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Key label, e.g. `"←/h"`.
    pub key: String,
    /// Action description, e.g. `"prev page"`.
    pub desc: String,
}

/// A set of key presses triggering one action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    enabled: bool,
}

impl Binding {
    /// Binds plain key codes.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().map(KeyPress::from).collect(),
            help: Help::default(),
            enabled: true,
        }
    }

    /// Sets the help label and description (builder pattern).
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Whether `msg` triggers this binding. Disabled bindings never match.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled && self.keys.iter().any(|k| k.matches(msg))
    }

    /// The help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// The bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// Whether the binding is active.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the binding. Disabled bindings are hidden from help.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Option applied by [`new_binding`].
pub type BindingOpt = Box<dyn FnOnce(&mut Binding)>;

/// Builds a binding from options, mirroring the functional-option style.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::new(Vec::new());
    for opt in opts {
        opt(&mut binding);
    }
    binding
}

/// Adds key presses given by name. Unknown names are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    let parsed: Vec<KeyPress> = keys.iter().filter_map(|k| KeyPress::parse(k)).collect();
    Box::new(move |b: &mut Binding| b.keys.extend(parsed))
}

/// Sets the help text.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    let help = Help {
        key: key.to_string(),
        desc: desc.to_string(),
    };
    Box::new(move |b: &mut Binding| b.help = help)
}

/// Implemented by anything that wants its bindings listed by
/// [`help::Model`](crate::help::Model).
pub trait KeyMap {
    /// Bindings for the one-line help.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped in columns for the expanded help.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
