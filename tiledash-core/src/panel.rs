// tiledash-core/src/panel.rs
use crate::config::{BorderColors, ConfigError, PanelConfig};
use crate::context::AppContext;
use crate::position::Position;
use crate::surface::Surface;
use crossterm::event::KeyEvent;
use ratatui::style::Color;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Consumed, // Stop propagation
    Ignored,  // Continue to next handler
}

/// One dashboard tile: the unit of refresh, focus and display.
///
/// Implementations hold a [`PanelBase`] and expose it through [`Panel::base`];
/// everything except [`Panel::refresh`] has a default that delegates to it.
/// Panels are shared between the UI thread and their refresh thread, so all
/// methods take `&self` and mutable state lives behind locks.
pub trait Panel: Send + Sync {
    /// Shared state common to every panel
    fn base(&self) -> &PanelBase;

    /// Fetch or recompute data and write it to the surface.
    ///
    /// Must not block indefinitely and must not fail: errors are rendered
    /// into the panel instead.
    fn refresh(&self);

    /// Release watchers, threads and other background resources.
    /// Safe to call before the first refresh and more than once.
    fn close(&self) -> Result<(), PanelError> {
        Ok(())
    }

    /// Handle a key while the panel holds input focus
    fn handle_key(&self, _key: KeyEvent) -> EventResult {
        EventResult::Ignored
    }

    fn enabled(&self) -> bool {
        self.base().enabled()
    }

    fn focusable(&self) -> bool {
        self.base().focusable()
    }

    fn focus_key(&self) -> Option<String> {
        self.base().focus_key()
    }

    fn set_focus_key(&self, key: &str) {
        self.base().set_focus_key(key)
    }

    /// Seconds between scheduled refreshes; zero or less opts out
    fn refresh_interval(&self) -> i64 {
        self.base().refresh_interval()
    }

    fn position(&self) -> Position {
        self.base().position()
    }

    fn title(&self) -> &str {
        self.base().title()
    }

    /// Stable render target, the same object for the panel's lifetime
    fn surface(&self) -> &Surface {
        self.base().surface()
    }

    /// Border colour while the panel does not hold focus
    fn border_color(&self) -> Color {
        self.base().border_color()
    }
}

/// Behaviour shared by every panel type
pub struct PanelBase {
    kind: String,
    title: String,
    enabled: AtomicBool,
    focusable: bool,
    focus_key: RwLock<Option<String>>,
    position: Position,
    refresh_interval: i64,
    border: BorderColors,
    surface: Surface,
}

impl PanelBase {
    /// `default_title` is used unless the config sets a title
    pub fn new(
        default_title: &str,
        config: &PanelConfig,
        focusable: bool,
        ctx: &AppContext,
    ) -> Self {
        let base = Self {
            kind: config.kind.clone(),
            title: config
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| default_title.to_string()),
            enabled: AtomicBool::new(config.enabled),
            focusable,
            focus_key: RwLock::new(config.focus_key.clone().filter(|k| !k.is_empty())),
            position: config.position.into(),
            refresh_interval: config.refresh_interval,
            border: config.colors.border.clone(),
            surface: Surface::new(ctx.signals.clone()),
        };

        base.surface.set_title(base.contextual_title(&base.title));
        base.surface.set_title_color(config.colors.title.to_color());
        base.surface.set_colors(
            config.colors.foreground.to_color(),
            config.colors.background.to_color(),
        );
        base.surface.set_border_color(base.border_color());
        base
    }

    /// Registered type name this panel was built from
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn disabled(&self) -> bool {
        !self.enabled()
    }

    /// Disabling a live panel stops its scheduled refreshes for good and
    /// drops it from focus cycling; only a reload brings it back.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn focusable(&self) -> bool {
        self.enabled() && self.focusable
    }

    pub fn focus_key(&self) -> Option<String> {
        self.focus_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_focus_key(&self, key: &str) {
        *self
            .focus_key
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(key.to_string());
        self.surface.set_title(self.contextual_title(&self.title));
    }

    pub fn refresh_interval(&self) -> i64 {
        self.refresh_interval
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn border_color(&self) -> Color {
        if self.focusable() {
            self.border.focusable.to_color()
        } else {
            self.border.normal.to_color()
        }
    }

    pub fn focused_border_color(&self) -> Color {
        self.border.focused.to_color()
    }

    /// Title decorated with the focus key, e.g. ` Clocks [2] `
    pub fn contextual_title(&self, text: &str) -> String {
        match self.focus_key() {
            Some(key) => format!(" {} [{}] ", text, key),
            None => format!(" {} ", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, panel_config};

    #[test]
    fn test_title_falls_back_to_default() {
        let ctx = context();
        let base = PanelBase::new("Clocks", &panel_config("clocks", 5), false, &ctx);
        assert_eq!(base.title(), "Clocks");
        assert_eq!(base.surface().title(), " Clocks ");

        let mut config = panel_config("clocks", 5);
        config.title = Some("World".to_string());
        let base = PanelBase::new("Clocks", &config, false, &ctx);
        assert_eq!(base.title(), "World");
    }

    #[test]
    fn test_focusable_requires_enabled() {
        let ctx = context();
        let base = PanelBase::new("A", &panel_config("a", 5), true, &ctx);
        assert!(base.focusable());

        base.set_enabled(false);
        assert!(!base.focusable());
        assert!(base.disabled());
    }

    #[test]
    fn test_focus_key_updates_title() {
        let ctx = context();
        let base = PanelBase::new("Git", &panel_config("git", 5), true, &ctx);
        assert_eq!(base.focus_key(), None);

        base.set_focus_key("3");
        assert_eq!(base.focus_key().as_deref(), Some("3"));
        assert_eq!(base.surface().title(), " Git [3] ");
    }

    #[test]
    fn test_border_color_depends_on_focusability() {
        let ctx = context();
        let focusable = PanelBase::new("A", &panel_config("a", 5), true, &ctx);
        let plain = PanelBase::new("B", &panel_config("b", 5), false, &ctx);

        assert_eq!(focusable.border_color(), Color::Red);
        assert_eq!(plain.border_color(), Color::Gray);
        assert_eq!(focusable.surface().border_color(), Color::Red);
    }
}
