// tiledash-core/src/surface.rs
use crate::signal::SignalSender;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::Widget as RatatuiWidget,
    style::{Color, Style},
    text::Text,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a render surface, stable for the surface's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

#[derive(Debug, Clone)]
struct SurfaceState {
    title: String,
    text: Text<'static>,
    title_color: Color,
    border_color: Color,
    foreground: Color,
    background: Color,
    wrap: bool,
    scroll: u16,
}

/// Bordered text view a panel renders into.
///
/// Cloning yields another handle to the same surface. Panels write from
/// their refresh threads; the UI loop only reads while composing a frame.
/// Every write sends a repaint signal so the UI loop redraws on its own
/// thread.
#[derive(Clone)]
pub struct Surface {
    id: SurfaceId,
    state: Arc<Mutex<SurfaceState>>,
    signals: SignalSender,
}

impl Surface {
    pub fn new(signals: SignalSender) -> Self {
        Self {
            id: SurfaceId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(Mutex::new(SurfaceState {
                title: String::new(),
                text: Text::default(),
                title_color: Color::Reset,
                border_color: Color::Reset,
                foreground: Color::Reset,
                background: Color::Reset,
                wrap: false,
                scroll: 0,
            })),
            signals,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut SurfaceState)) {
        f(&mut self.lock());
        self.signals.repaint();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.update(|s| s.title = title);
    }

    pub fn set_text(&self, text: impl Into<Text<'static>>) {
        let text = text.into();
        self.update(|s| {
            s.text = text;
            s.scroll = 0;
        });
    }

    pub fn set_title_color(&self, color: Color) {
        self.update(|s| s.title_color = color);
    }

    pub fn set_border_color(&self, color: Color) {
        self.update(|s| s.border_color = color);
    }

    pub fn set_colors(&self, foreground: Color, background: Color) {
        self.update(|s| {
            s.foreground = foreground;
            s.background = background;
        });
    }

    pub fn set_wrap(&self, wrap: bool) {
        self.update(|s| s.wrap = wrap);
    }

    /// Scroll the text by `delta` lines, clamped to the text length
    pub fn scroll_by(&self, delta: i32) {
        self.update(|s| {
            let max = s.text.lines.len().saturating_sub(1).min(u16::MAX as usize) as i32;
            s.scroll = (s.scroll as i32).saturating_add(delta).clamp(0, max) as u16;
        });
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn border_color(&self) -> Color {
        self.lock().border_color
    }

    /// Plain text content, lines joined with '\n'
    pub fn content(&self) -> String {
        self.lock()
            .text
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let state = self.lock().clone();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(state.title)
            .title_style(Style::default().fg(state.title_color))
            .border_style(Style::default().fg(state.border_color));

        let mut paragraph = Paragraph::new(state.text)
            .block(block)
            .style(Style::default().fg(state.foreground).bg(state.background))
            .scroll((state.scroll, 0));
        if state.wrap {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }

        RatatuiWidget::render(paragraph, area, buf);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{self, Signal};

    #[test]
    fn test_clones_share_state() {
        let (tx, _rx) = signal::channel();
        let surface = Surface::new(tx);
        let handle = surface.clone();

        handle.set_title(" Clocks ");
        assert_eq!(surface.title(), " Clocks ");
        assert_eq!(surface.id(), handle.id());
    }

    #[test]
    fn test_ids_are_unique() {
        let (tx, _rx) = signal::channel();
        assert_ne!(Surface::new(tx.clone()).id(), Surface::new(tx).id());
    }

    #[test]
    fn test_writes_request_repaint() {
        let (tx, rx) = signal::channel();
        let surface = Surface::new(tx);

        surface.set_text("hello\nworld");
        assert_eq!(rx.try_recv().unwrap(), Signal::Repaint);
        assert_eq!(surface.content(), "hello\nworld");
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (tx, _rx) = signal::channel();
        let surface = Surface::new(tx);
        surface.set_text("a\nb\nc");

        surface.scroll_by(10);
        assert_eq!(surface.lock().scroll, 2);
        surface.scroll_by(-10);
        assert_eq!(surface.lock().scroll, 0);
    }

    #[test]
    fn test_scroll_stops_at_u16_max_on_long_text() {
        let (tx, _rx) = signal::channel();
        let surface = Surface::new(tx);
        surface.set_text("x\n".repeat(70_000));

        surface.scroll_by(100_000);
        assert_eq!(surface.lock().scroll, u16::MAX);
        surface.scroll_by(i32::MAX);
        assert_eq!(surface.lock().scroll, u16::MAX);
        surface.scroll_by(-1);
        assert_eq!(surface.lock().scroll, u16::MAX - 1);
    }

    #[test]
    fn test_render_draws_title_and_text() {
        let (tx, _rx) = signal::channel();
        let surface = Surface::new(tx);
        surface.set_title("Box");
        surface.set_text("hi");

        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        surface.render(area, &mut buf);

        let top: String = (0..10).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        let middle: String = (0..10).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(top.contains("Box"));
        assert!(middle.contains("hi"));
    }
}
