// tiledash-core/src/overlay.rs
use crate::display::FocusHost;
use crate::panel::EventResult;
use crate::signal::SignalSender;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Widget as RatatuiWidget,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct HelpText {
    title: String,
    text: String,
    scroll: u16,
}

/// Modal overlays mounted above the panel grid.
///
/// While an overlay is open the focus host reports [`InputFocus::Overlay`],
/// which puts the focus tracker in its board-focused state. Cloning yields
/// another handle to the same overlay stack.
///
/// [`InputFocus::Overlay`]: crate::display::InputFocus::Overlay
#[derive(Clone)]
pub struct Overlays {
    host: FocusHost,
    signals: SignalSender,
    help: Arc<Mutex<Option<HelpText>>>,
}

impl Overlays {
    pub fn new(host: FocusHost, signals: SignalSender) -> Self {
        Self {
            host,
            signals,
            help: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<HelpText>> {
        self.help.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn host(&self) -> &FocusHost {
        &self.host
    }

    /// Show a help text modal, replacing any open one
    pub fn show_help(&self, title: &str, text: &str) {
        let was_open = self.lock().replace(HelpText {
            title: title.to_string(),
            text: text.to_string(),
            scroll: 0,
        });
        if was_open.is_none() {
            self.host.enter_overlay();
        }
        self.signals.repaint();
    }

    /// Close the open modal and hand input focus back to whatever held it.
    /// Returns false when nothing was open.
    pub fn dismiss(&self) -> bool {
        if self.lock().take().is_none() {
            return false;
        }
        self.host.leave_overlay();
        self.signals.repaint();
        true
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    pub fn handle_key(&self, key: KeyEvent) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('/') | KeyCode::Char('q') => {
                self.dismiss();
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            _ => {}
        }
        // Modal: nothing leaks through to the panels
        EventResult::Consumed
    }

    fn scroll_by(&self, delta: i32) {
        if let Some(help) = self.lock().as_mut() {
            let max = help.text.lines().count().saturating_sub(1).min(u16::MAX as usize) as i32;
            help.scroll = (help.scroll as i32).saturating_add(delta).clamp(0, max) as u16;
        }
        self.signals.repaint();
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let Some(help) = self.lock().clone() else {
            return;
        };

        let popup = centered_rect(60, 60, area);
        RatatuiWidget::render(Clear, popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", help.title))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(" Esc to close ").right_aligned())
            .border_style(Style::default().fg(Color::Yellow));

        let paragraph = Paragraph::new(help.text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help.scroll, 0));
        RatatuiWidget::render(paragraph, popup, buf);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}
