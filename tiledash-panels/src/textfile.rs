// tiledash-panels/src/textfile.rs
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Style},
    text::{Line, Text},
};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::common::Highlighter;
use tiledash_core::watcher::{FileWatcher, watch_file};
use tiledash_core::{
    AppContext, EventResult, FileSystem, Formatter, MultiSource, Overlays, Panel, PanelBase,
    PanelConfig, PanelConfigSource, PanelError,
};

pub const HELP_TEXT: &str = "
  Keyboard commands for Textfile:

    /: Show/hide this help window
    h: Previous text file
    l: Next text file
    o: Open the text file in the operating system

    arrow left:  Previous text file
    arrow right: Next text file
    arrow up/down, j/k: Scroll
";

#[derive(Debug, Deserialize)]
struct TextfileConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    file_paths: Vec<String>,
    #[serde(default = "default_wrap")]
    wrap: bool,
    /// Syntax-highlight the file by its extension
    #[serde(default)]
    format: bool,
    #[serde(default = "default_format_style")]
    format_style: String,
}

fn default_wrap() -> bool {
    true
}

fn default_format_style() -> String {
    "vim".to_string()
}

/// State shared with the file watcher callbacks
struct Shared {
    base: PanelBase,
    sources: Mutex<MultiSource>,
    /// Held from snapshot to surface write; watcher threads and the UI
    /// thread both display
    displaying: Mutex<()>,
    fs: FileSystem,
    formatter: Formatter,
    highlighter: Option<Highlighter>,
}

impl Shared {
    fn sources(&self) -> MutexGuard<'_, MultiSource> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_title(&self, current: Option<&str>) {
        let name = current.unwrap_or(self.base.title());
        self.base
            .surface()
            .set_title(self.base.contextual_title(name));
    }

    fn lock_display(&self) -> MutexGuard<'_, ()> {
        self.displaying.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn display(&self) {
        let _guard = self.lock_display();
        let sources = self.sources().clone();
        self.update_title(sources.current());

        let mut lines = vec![Line::from(
            self.formatter.sigil_str(sources.len(), sources.index()),
        )];
        match sources.current() {
            Some(path) => match self.fs.read_to_string(path) {
                Ok(text) => match &self.highlighter {
                    Some(highlighter) => lines.extend(highlighter.highlight(path, &text)),
                    None => lines.extend(text.lines().map(|l| Line::from(l.to_string()))),
                },
                Err(e) => lines.push(Line::styled(
                    format!("{}: {}", path, e),
                    Style::default().fg(Color::Red),
                )),
            },
            None => lines.push(Line::from(" no file configured")),
        }

        self.base.surface().set_text(Text::from(lines));
    }
}

/// Shows one of several text files, reloading when the file changes.
///
/// Scheduled refreshes are turned off: the panel is drawn once on start
/// and after that only when a watched file is written or the user pages.
pub struct TextfilePanel {
    shared: Arc<Shared>,
    overlays: Overlays,
    watchers: Mutex<Vec<FileWatcher>>,
}

impl TextfilePanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let mut config: TextfileConfig = source.decode()?;
        config.base.refresh_interval = 0;

        let shared = Arc::new(Shared {
            base: PanelBase::new("Textfile", &config.base, true, ctx),
            sources: Mutex::new(MultiSource::new(config.file_path, config.file_paths)),
            displaying: Mutex::new(()),
            fs: ctx.fs.clone(),
            formatter: Formatter::for_panel(&config.base),
            highlighter: config
                .format
                .then(|| Highlighter::new(&config.format_style)),
        });
        shared.base.surface().set_wrap(config.wrap);

        let watchers = Self::watch_sources(&shared);

        Ok(Self {
            shared,
            overlays: ctx.overlays.clone(),
            watchers: Mutex::new(watchers),
        })
    }

    fn watch_sources(shared: &Arc<Shared>) -> Vec<FileWatcher> {
        let paths = shared.sources().sources().to_vec();

        paths
            .iter()
            .filter_map(|source| {
                let path = match shared.fs.expand_home_dir(source) {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!(source = %source, "not watching file: {e}");
                        return None;
                    }
                };

                let target = Arc::clone(shared);
                match watch_file(&path, move || target.display()) {
                    Ok(watcher) => Some(watcher),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "not watching file: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn sources(&self) -> MultiSource {
        self.shared.sources().clone()
    }

    /// Number of files currently watched
    pub fn watching(&self) -> usize {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next_source(&self) {
        self.shared.sources().next();
        self.shared.display();
    }

    fn prev_source(&self) {
        self.shared.sources().prev();
        self.shared.display();
    }

    fn open_current(&self) {
        let current = self.shared.sources().current().map(str::to_string);
        if let Some(path) = current
            && let Err(e) = self.shared.fs.open_file(Path::new(&path))
        {
            tracing::warn!(path = %path, "could not open file: {e}");
        }
    }
}

impl Panel for TextfilePanel {
    fn base(&self) -> &PanelBase {
        &self.shared.base
    }

    fn refresh(&self) {
        self.shared.display();
    }

    fn close(&self) -> Result<(), PanelError> {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn set_focus_key(&self, key: &str) {
        let _guard = self.shared.lock_display();
        self.shared.base.set_focus_key(key);
        let current = self.shared.sources().current().map(str::to_string);
        self.shared.update_title(current.as_deref());
    }

    fn handle_key(&self, key: KeyEvent) -> EventResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return EventResult::Ignored;
        }

        match key.code {
            KeyCode::Char('/') => self.overlays.show_help(self.title(), HELP_TEXT),
            KeyCode::Char('h') | KeyCode::Left => self.prev_source(),
            KeyCode::Char('l') | KeyCode::Right => self.next_source(),
            KeyCode::Char('o') => self.open_current(),
            KeyCode::Char('j') | KeyCode::Down => self.surface().scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.surface().scroll_by(-1),
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }
}
