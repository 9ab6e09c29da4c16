// tiledash-panels/src/common/highlight.rs
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::path::Path;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when the configured style is unknown
pub const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Map a style name to one of the bundled syntect themes.
///
/// Bundled theme names are accepted as-is; a few common short names are
/// aliased.
pub fn theme_name(style: &str) -> &str {
    match style.to_lowercase().as_str() {
        "vim" | "eighties" => "base16-eighties.dark",
        "monokai" | "mocha" => "base16-mocha.dark",
        "ocean" | "dark" => "base16-ocean.dark",
        "light" => "base16-ocean.light",
        "github" => "InspiredGitHub",
        "solarized-dark" => "Solarized (dark)",
        "solarized-light" => "Solarized (light)",
        _ => style,
    }
}

/// Syntax highlighter producing ratatui lines
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(style: &str) -> Self {
        let mut themes = ThemeSet::load_defaults();
        let theme = match themes.themes.remove(theme_name(style)) {
            Some(theme) => theme,
            None => {
                tracing::warn!(style, "unknown format style, using {FALLBACK_THEME}");
                themes.themes.remove(FALLBACK_THEME).unwrap_or_default()
            }
        };

        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Syntax for `path`, by extension, then file name, then first line
    fn syntax_for(&self, path: &str, text: &str) -> &SyntaxReference {
        let path = Path::new(path);
        let by_name = |name: Option<&std::ffi::OsStr>| {
            name.and_then(|n| n.to_str())
                .and_then(|n| self.syntaxes.find_syntax_by_extension(n))
        };

        by_name(path.extension())
            .or_else(|| by_name(path.file_name()))
            .or_else(|| {
                text.lines()
                    .next()
                    .and_then(|line| self.syntaxes.find_syntax_by_first_line(line))
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    pub fn syntax_name(&self, path: &str, text: &str) -> &str {
        &self.syntax_for(path, text).name
    }

    pub fn highlight(&self, path: &str, text: &str) -> Vec<Line<'static>> {
        let mut highlighter = HighlightLines::new(self.syntax_for(path, text), &self.theme);

        LinesWithEndings::from(text)
            .map(|line| match highlighter.highlight_line(line, &self.syntaxes) {
                Ok(regions) => Line::from(
                    regions
                        .into_iter()
                        .map(|(style, piece)| {
                            Span::styled(trim_newline(piece).to_string(), convert_style(style))
                        })
                        .collect::<Vec<_>>(),
                ),
                Err(e) => {
                    tracing::debug!("highlighting failed: {e}");
                    Line::from(trim_newline(line).to_string())
                }
            })
            .collect()
    }
}

fn trim_newline(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut converted = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_aliases() {
        assert_eq!(theme_name("vim"), "base16-eighties.dark");
        assert_eq!(theme_name("GitHub"), "InspiredGitHub");
        assert_eq!(theme_name("Solarized (dark)"), "Solarized (dark)");
    }

    #[test]
    fn test_rust_source_gets_colored_spans() {
        let highlighter = Highlighter::new("vim");
        let lines = highlighter.highlight("main.rs", "fn main() {\n    let x = 1;\n}\n");

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].to_string(), "fn main() {");
        assert!(lines[0].spans.len() > 1);
        assert!(
            lines[0]
                .spans
                .iter()
                .all(|span| matches!(span.style.fg, Some(Color::Rgb(..))))
        );
    }

    #[test]
    fn test_syntax_detection() {
        let highlighter = Highlighter::new("vim");
        assert_eq!(highlighter.syntax_name("lib.rs", ""), "Rust");
        assert_eq!(highlighter.syntax_name("Makefile", ""), "Makefile");
        assert_eq!(
            highlighter.syntax_name("deploy-hook", "#!/bin/bash\necho hi"),
            "Bourne Again Shell (bash)"
        );
        assert_eq!(highlighter.syntax_name("notes.unknown", "hello"), "Plain Text");
    }

    #[test]
    fn test_unknown_style_falls_back() {
        let highlighter = Highlighter::new("no-such-style");
        let lines = highlighter.highlight("a.txt", "plain words");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), "plain words");
    }
}
