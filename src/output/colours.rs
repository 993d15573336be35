//! Colour handling for host output
//!
//! Colours are used only on a terminal, never when NO_COLOR is set, and never
//! with `--no-color`.

use std::io::IsTerminal;
use colored::{ColoredString, Colorize};
use crate::plugin::ContextState;

#[derive(Debug, Clone, Copy)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    /// Decide from the `--no-color` flag and the environment
    pub fn from_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag
            && std::env::var("NO_COLOR").is_err()
            && std::io::stdout().is_terminal();
        Self { enabled }
    }

    pub fn with_colours(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.bold().cyan())
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.green())
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.yellow())
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.red())
    }

    /// Lifecycle state coloured by how far the context got
    pub fn state(&self, state: ContextState) -> ColoredString {
        let text = state.to_string();
        match state {
            ContextState::PluginsInitialized => self.success(&text),
            ContextState::ServicesInitialized | ContextState::Loaded => self.warning(&text),
            ContextState::Created | ContextState::Unloaded => self.error(&text),
        }
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> ColoredString {
        if self.enabled {
            style(text)
        } else {
            text.normal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_colours_leave_text_plain() {
        let colours = ColourManager::with_colours(false);
        assert_eq!(colours.highlight("Modules").to_string(), "Modules");
        assert_eq!(colours.state(ContextState::Loaded).to_string(), "loaded");
    }

    #[test]
    fn test_no_color_flag_wins() {
        assert!(!ColourManager::from_args(true).colours_enabled());
    }
}
