//! Syntax highlighting for fenced code blocks, using syntect's bundled
//! syntaxes and themes and emitting 24-bit ANSI escapes.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::config::DEFAULT_THEME;

/// Turns a code string in a named language into display text.
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Leaves code untouched. Used when colour output is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        code.to_string()
    }
}

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Highlighter with the default dark theme.
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Unknown theme names fall back to the default theme.
    pub fn with_theme(name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(theme = name, "unknown highlight theme, using {}", DEFAULT_THEME);
                themes.remove(DEFAULT_THEME).unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    fn syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lower = language.to_lowercase();
        let token = match lower.as_str() {
            "py" => "python",
            "rs" => "rust",
            "js" | "jsx" => "javascript",
            "ts" | "tsx" => "typescript",
            "rb" => "ruby",
            "kt" => "kotlin",
            "sh" | "shell" | "zsh" | "console" => "bash",
            "yml" => "yaml",
            "md" => "markdown",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }

    pub fn is_supported(&self, language: &str) -> bool {
        self.syntax(language).is_some()
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        let Some(syntax) = self.syntax(language) else {
            return code.to_string();
        };

        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            match lines.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
                Err(err) => {
                    tracing::debug!(error = %err, language, "highlighting failed");
                    return code.to_string();
                }
            }
        }
        // Reset so the terminal colour does not bleed past the block.
        out.push_str("\x1b[0m");
        out
    }
}
